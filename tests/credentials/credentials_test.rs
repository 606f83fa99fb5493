//! Coverage for `.env` loading and Telegram credential validation.

use std::collections::BTreeMap;
use std::path::Path;

use drugshift::credentials::{
    layered_resolver, load_credentials, load_runtime_credentials_with, Credentials,
    CredentialsError, TelegramCredentials,
};

fn creds(pairs: &[(&str, &str)]) -> Credentials {
    Credentials::from_map(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn write_env(path: &Path, contents: &str) {
    std::fs::write(path, contents).expect("should write env file");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .expect("should set permissions");
    }
}

#[test]
fn valid_credentials_are_extracted() {
    let telegram = TelegramCredentials::from_credentials(&creds(&[
        ("API_ID", "12345"),
        ("API_HASH", "abcdef"),
        ("BOT_TOKEN", " 123:token "),
    ]))
    .expect("credentials should validate");
    assert_eq!(telegram.api_id, 12345);
    assert_eq!(telegram.api_hash, "abcdef");
    assert_eq!(telegram.bot_token, "123:token");
}

#[test]
fn all_missing_keys_are_reported_together() {
    let err = TelegramCredentials::from_credentials(&creds(&[("API_HASH", "abc")]))
        .expect_err("should fail");
    match err {
        CredentialsError::Missing(keys) => assert_eq!(keys, vec!["API_ID", "BOT_TOKEN"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blank_values_count_as_missing() {
    let err = TelegramCredentials::from_credentials(&creds(&[
        ("API_ID", "1"),
        ("API_HASH", "  "),
        ("BOT_TOKEN", "t"),
    ]))
    .expect_err("should fail");
    assert!(err.to_string().contains("API_HASH"));
}

#[test]
fn non_integer_api_id_is_rejected() {
    let err = TelegramCredentials::from_credentials(&creds(&[
        ("API_ID", "twelve"),
        ("API_HASH", "abc"),
        ("BOT_TOKEN", "t"),
    ]))
    .expect_err("should fail");
    assert!(matches!(err, CredentialsError::InvalidInteger { .. }));
    assert!(err.to_string().contains("API_ID"));
}

#[test]
fn debug_output_redacts_secrets() {
    let creds = creds(&[("API_ID", "1"), ("API_HASH", "hash-secret"), ("BOT_TOKEN", "tok-secret")]);
    let debug = format!("{creds:?}");
    assert!(!debug.contains("hash-secret"));
    assert!(!debug.contains("tok-secret"));

    let telegram = TelegramCredentials::from_credentials(&creds).expect("should validate");
    let debug = format!("{telegram:?}");
    assert!(!debug.contains("hash-secret"));
    assert!(!debug.contains("tok-secret"));
}

#[test]
fn env_file_is_parsed() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join(".env");
    write_env(&path, "API_ID=1\nAPI_HASH=h\n# comment\nBOT_TOKEN=\"1:abc\"\n");

    let creds = load_credentials(&path).expect("env file should load");
    assert_eq!(creds.get("API_ID"), Some("1"));
    assert_eq!(creds.get("BOT_TOKEN"), Some("1:abc"));
    assert_eq!(creds.len(), 3);
}

#[cfg(unix)]
#[test]
fn world_readable_env_file_is_rejected() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join(".env");
    std::fs::write(&path, "BOT_TOKEN=x\n").expect("should write env file");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))
        .expect("should set permissions");

    let err = load_credentials(&path).expect_err("should reject");
    assert!(matches!(err, CredentialsError::InsecurePermissions { mode: 0o644, .. }));
}

#[test]
fn process_env_overrides_env_file() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join(".env");
    write_env(&path, "BOT_TOKEN=file\nAPI_ID=1\n");

    let creds = load_runtime_credentials_with(&path, |key| {
        (key == "BOT_TOKEN").then(|| "env".to_owned())
    })
    .expect("should load");
    assert_eq!(creds.get("BOT_TOKEN"), Some("env"));
    assert_eq!(creds.get("API_ID"), Some("1"));
}

#[test]
fn missing_env_file_falls_back_to_environment() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("absent.env");

    let creds = load_runtime_credentials_with(&path, |key| match key {
        "API_ID" => Some("7".to_owned()),
        "UNRELATED" => Some("ignored".to_owned()),
        _ => None,
    })
    .expect("should load");
    assert_eq!(creds.get("API_ID"), Some("7"));
    assert_eq!(creds.get("UNRELATED"), None);
    assert_eq!(creds.len(), 1);
}

#[test]
fn layered_resolver_prefers_process_env_for_any_key() {
    let dotenv = creds(&[("DRUGSHIFT_LOG_LEVEL", "debug"), ("BOT_TOKEN", "file")]);
    let resolve = layered_resolver(&dotenv, |key| match key {
        "DRUGSHIFT_LOG_LEVEL" => Some("warn".to_owned()),
        _ => None,
    });
    assert_eq!(resolve("DRUGSHIFT_LOG_LEVEL").as_deref(), Some("warn"));
    assert_eq!(resolve("BOT_TOKEN").as_deref(), Some("file"));
    assert_eq!(resolve("UNSET"), None);
}

#[test]
fn layered_resolver_drives_config_overrides() {
    let dotenv = creds(&[("DRUGSHIFT_LOG_LEVEL", "debug")]);
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("bot.toml");
    std::fs::write(&path, "[logging]\nlevel = \"error\"\n").expect("should write config");

    let from_file_only =
        drugshift::config::Config::load(Some(&path), layered_resolver(&dotenv, |_| None))
            .expect("config should load");
    assert_eq!(from_file_only.logging.level, "debug");

    let with_env = drugshift::config::Config::load(
        Some(&path),
        layered_resolver(&dotenv, |key| {
            (key == "DRUGSHIFT_LOG_LEVEL").then(|| "warn".to_owned())
        }),
    )
    .expect("config should load");
    assert_eq!(with_env.logging.level, "warn");
}
