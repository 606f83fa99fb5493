//! Tests for `telegram::handle_event` with an in-memory sink.

use drugshift::router::{InboundEvent, MessageRouter, OutboundReply, ReplyTexts, Route, SenderId};
use drugshift::telegram::{handle_event, HandleOutcome, RecordingSink};

fn router() -> MessageRouter {
    MessageRouter::new(ReplyTexts {
        welcome: "<b>welcome</b>".to_owned(),
        canned: "canned".to_owned(),
    })
}

#[tokio::test]
async fn start_delivers_welcome_once() {
    let sink = RecordingSink::new();
    let outcome = handle_event(
        &router(),
        &sink,
        &InboundEvent::command(SenderId(42), "start", ""),
    )
    .await;

    assert_eq!(outcome, HandleOutcome::Delivered(Route::Welcome));
    assert_eq!(
        sink.sent().await,
        vec![OutboundReply {
            target: SenderId(42),
            text: "<b>welcome</b>".to_owned(),
        }]
    );
}

#[tokio::test]
async fn text_delivers_canned_reply() {
    let sink = RecordingSink::new();
    let outcome = handle_event(&router(), &sink, &InboundEvent::text(SenderId(7), "hello")).await;

    assert_eq!(outcome, HandleOutcome::Delivered(Route::CannedReply));
    let sent = sink.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].target, SenderId(7));
    assert_eq!(sent[0].text, "canned");
}

#[tokio::test]
async fn other_command_sends_nothing() {
    let sink = RecordingSink::new();
    let outcome = handle_event(
        &router(),
        &sink,
        &InboundEvent::command(SenderId(7), "help", ""),
    )
    .await;

    assert_eq!(outcome, HandleOutcome::Ignored);
    assert!(sink.sent().await.is_empty());
}

#[tokio::test]
async fn repeated_event_is_answered_each_time() {
    let sink = RecordingSink::new();
    let router = router();
    let event = InboundEvent::text(SenderId(9), "");

    handle_event(&router, &sink, &event).await;
    handle_event(&router, &sink, &event).await;

    let sent = sink.sent().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
}

#[tokio::test]
async fn delivery_failure_is_reported_and_not_retried() {
    let sink = RecordingSink::failing_for([SenderId(13)]);
    let router = router();

    let failed = handle_event(&router, &sink, &InboundEvent::text(SenderId(13), "hi")).await;
    assert_eq!(failed, HandleOutcome::DeliveryFailed(Route::CannedReply));
    assert!(sink.sent().await.is_empty());

    // The next event is handled normally.
    let ok = handle_event(&router, &sink, &InboundEvent::text(SenderId(14), "hi")).await;
    assert_eq!(ok, HandleOutcome::Delivered(Route::CannedReply));
    assert_eq!(sink.sent().await.len(), 1);
}
