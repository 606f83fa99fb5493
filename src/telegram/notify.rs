//! One-off posts to the configured target channel.

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, Recipient};
use tracing::info;

use crate::config::TargetChannel;
use crate::telegram::sink::DeliveryError;

impl From<&TargetChannel> for Recipient {
    fn from(target: &TargetChannel) -> Self {
        match target {
            TargetChannel::Id(id) => Recipient::Id(ChatId(*id)),
            TargetChannel::Username(name) => Recipient::ChannelUsername(name.clone()),
        }
    }
}

/// Send `text` (HTML) to `target`.
///
/// # Errors
///
/// Returns [`DeliveryError::Request`] when the Bot API call fails.
pub async fn send_notification(
    bot: &Bot,
    target: &TargetChannel,
    text: &str,
) -> Result<(), DeliveryError> {
    bot.send_message(Recipient::from(target), text)
        .parse_mode(ParseMode::Html)
        .await?;
    info!(channel = %target, "notification sent");
    Ok(())
}
