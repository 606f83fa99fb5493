//! Conversion of Telegram messages into router events.

use teloxide::types::{Message, MessageKind};

use crate::router::{InboundEvent, SenderId};

/// Parse a message body into an event for `sender`.
///
/// `/name args` is a command. An `@bot` suffix naming this bot is dropped;
/// a suffix naming another bot means the command is not ours and `None` is
/// returned. With `bot_username` unknown every suffix is accepted.
/// Everything else, including `""`, a lone `/` and `/ x`, is plain text.
pub fn parse_event(sender: SenderId, body: &str, bot_username: Option<&str>) -> Option<InboundEvent> {
    if let Some(rest) = body.strip_prefix('/') {
        let (token, args) = match rest.split_once(char::is_whitespace) {
            Some((token, args)) => (token, args.trim()),
            None => (rest, ""),
        };
        // "/help@drugshift_bot" in group chats
        let (name, addressee) = match token.split_once('@') {
            Some((name, addressee)) => (name, Some(addressee)),
            None => (token, None),
        };
        if !name.is_empty() {
            if let (Some(addressee), Some(own)) = (addressee, bot_username) {
                // Telegram usernames are case-insensitive.
                if !addressee.eq_ignore_ascii_case(own.trim_start_matches('@')) {
                    return None;
                }
            }
            return Some(InboundEvent::command(sender, name, args));
        }
    }

    Some(InboundEvent::text(sender, body))
}

/// Build an event from a Telegram message, replying to its chat.
///
/// Ordinary messages without text (photos, stickers, ...) use their caption,
/// or the empty string, so they count as plain text. Service messages
/// (members joining, pins, ...) and commands for other bots produce no event.
pub fn event_from_message(msg: &Message, bot_username: Option<&str>) -> Option<InboundEvent> {
    let sender = SenderId(msg.chat.id.0);

    if let Some(text) = msg.text() {
        return parse_event(sender, text, bot_username);
    }

    if matches!(msg.kind, MessageKind::Common(_)) {
        return parse_event(sender, msg.caption().unwrap_or(""), bot_username);
    }

    None
}
