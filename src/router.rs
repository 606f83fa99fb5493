//! Message router: classifies one inbound event into at most one reply.
//!
//! Classification is first-match-wins:
//! 1. the `/start` command gets the welcome text
//! 2. plain text (anything that is not a command) gets the canned reply
//! 3. every other command is ignored
//!
//! The router holds only the two reply texts and never mutates them, so one
//! instance is shared across all concurrent handler invocations.

use std::fmt;

use crate::config::RepliesConfig;

/// Name of the command that triggers the welcome reply.
pub const START_COMMAND: &str = "start";

/// Identifier of the chat a reply is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SenderId(pub i64);

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of message arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A `/name args` command. `name` carries no slash and no `@bot` suffix.
    Command {
        /// Command name, e.g. `start`.
        name: String,
        /// Trimmed text after the command token. Empty when absent.
        args: String,
    },
    /// Any message that is not a command, including the empty string.
    Text(String),
}

/// A single message received from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Chat the message came from.
    pub sender: SenderId,
    /// Parsed message kind.
    pub kind: EventKind,
}

impl InboundEvent {
    /// Build a command event.
    pub fn command(sender: SenderId, name: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            sender,
            kind: EventKind::Command {
                name: name.into(),
                args: args.into(),
            },
        }
    }

    /// Build a plain text event.
    pub fn text(sender: SenderId, body: impl Into<String>) -> Self {
        Self {
            sender,
            kind: EventKind::Text(body.into()),
        }
    }
}

/// A single message to send back to a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    /// Chat to deliver to.
    pub target: SenderId,
    /// HTML-formatted payload.
    pub text: String,
}

/// Classification outcome for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/start`: reply with the welcome text.
    Welcome,
    /// Plain text: reply with the canned text.
    CannedReply,
    /// Any other command: stay silent.
    Ignore,
}

/// Classify an event kind. Pure; depends on nothing but its argument.
pub fn classify(kind: &EventKind) -> Route {
    match kind {
        EventKind::Command { name, .. } if name == START_COMMAND => Route::Welcome,
        EventKind::Text(_) => Route::CannedReply,
        EventKind::Command { .. } => Route::Ignore,
    }
}

/// The two fixed reply texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTexts {
    /// Sent in answer to `/start`.
    pub welcome: String,
    /// Sent in answer to every plain text message.
    pub canned: String,
}

/// Maps inbound events to outbound replies.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    texts: ReplyTexts,
}

impl MessageRouter {
    /// Create a router with the given reply texts.
    pub fn new(texts: ReplyTexts) -> Self {
        Self { texts }
    }

    /// Create a router from the `[replies]` config section.
    pub fn from_config(replies: &RepliesConfig) -> Self {
        Self::new(ReplyTexts {
            welcome: replies.welcome.clone(),
            canned: replies.canned.clone(),
        })
    }

    /// Reply texts this router answers with.
    pub fn texts(&self) -> &ReplyTexts {
        &self.texts
    }

    /// Produce the reply for `event`, or `None` when it is ignored.
    pub fn route(&self, event: &InboundEvent) -> Option<OutboundReply> {
        self.dispatch(event).1
    }

    /// Classify `event` once and build the matching reply.
    pub fn dispatch(&self, event: &InboundEvent) -> (Route, Option<OutboundReply>) {
        let route = classify(&event.kind);
        let text = match route {
            Route::Welcome => &self.texts.welcome,
            Route::CannedReply => &self.texts.canned,
            Route::Ignore => return (route, None),
        };

        let reply = OutboundReply {
            target: event.sender,
            text: text.clone(),
        };
        (route, Some(reply))
    }
}
