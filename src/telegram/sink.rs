//! Reply delivery.
//!
//! [`ReplySink`] is the seam between routing and the network. [`BotSink`]
//! sends through teloxide; [`RecordingSink`] keeps replies in memory.

use std::collections::HashSet;

use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio::sync::Mutex;

use crate::router::{OutboundReply, SenderId};

/// Errors produced while delivering a reply.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The Telegram API call failed.
    #[error("telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),
    /// The sink refused the reply.
    #[error("delivery to {0} rejected")]
    Rejected(SenderId),
}

/// Delivers outbound replies. Implementations must be shareable across
/// concurrently running handlers.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Deliver one reply. No retries.
    async fn deliver(&self, reply: &OutboundReply) -> Result<(), DeliveryError>;
}

/// Sends replies with the Bot API, HTML parse mode.
#[derive(Clone)]
pub struct BotSink {
    bot: Bot,
}

impl BotSink {
    /// Wrap a bot handle.
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReplySink for BotSink {
    async fn deliver(&self, reply: &OutboundReply) -> Result<(), DeliveryError> {
        self.bot
            .send_message(ChatId(reply.target.0), reply.text.clone())
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}

/// In-memory sink that records every delivered reply.
///
/// Targets registered with [`RecordingSink::failing_for`] are rejected.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<OutboundReply>>,
    failing: HashSet<SenderId>,
}

impl RecordingSink {
    /// Empty sink that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that rejects replies addressed to any of `targets`.
    pub fn failing_for(targets: impl IntoIterator<Item = SenderId>) -> Self {
        Self {
            sent: Mutex::default(),
            failing: targets.into_iter().collect(),
        }
    }

    /// Replies delivered so far, in delivery order.
    pub async fn sent(&self) -> Vec<OutboundReply> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn deliver(&self, reply: &OutboundReply) -> Result<(), DeliveryError> {
        if self.failing.contains(&reply.target) {
            return Err(DeliveryError::Rejected(reply.target));
        }
        self.sent.lock().await.push(reply.clone());
        Ok(())
    }
}
