//! Telegram adapter: message parsing, reply delivery, and the bot dispatcher.
//!
//! teloxide owns the connection and long polling. Each incoming message is
//! parsed into an [`InboundEvent`], routed, and the reply (if any) is handed
//! to a [`ReplySink`].

use std::sync::Arc;

use anyhow::Context;
use teloxide::prelude::*;
use teloxide::types::Me;
use tracing::{debug, info, warn};

use crate::router::{InboundEvent, MessageRouter, Route};

pub mod inbound;
pub mod notify;
pub mod sink;

pub use sink::{BotSink, DeliveryError, RecordingSink, ReplySink};

// ---------------------------------------------------------------------------
// Shared state for handler injection
// ---------------------------------------------------------------------------

/// Shared dependencies injected into teloxide handlers via `dptree::deps!`.
#[derive(Clone)]
struct SharedState {
    router: Arc<MessageRouter>,
    sink: Arc<dyn ReplySink>,
    bot_username: Option<Arc<str>>,
}

/// What happened to one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// A reply was produced and delivered.
    Delivered(Route),
    /// The event was an unrecognized command.
    Ignored,
    /// A reply was produced but delivery failed.
    DeliveryFailed(Route),
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Verify the bot token with `getMe`.
///
/// # Errors
///
/// Returns an error when Telegram rejects the token or is unreachable.
pub async fn authenticate(bot: &Bot) -> anyhow::Result<Me> {
    let me = bot
        .get_me()
        .await
        .context("failed to authenticate bot token")?;
    info!(
        username = me.user.username.as_deref().unwrap_or("<none>"),
        bot_id = me.user.id.0,
        "bot authenticated"
    );
    Ok(me)
}

/// Run the bot dispatcher until Ctrl+C.
///
/// Updates from different chats are handled concurrently; updates from one
/// chat are handled in order. `me` comes from [`authenticate`]; its username
/// decides which `/command@bot` messages are addressed to this bot.
pub async fn run_bot(bot: Bot, me: &Me, router: Arc<MessageRouter>) -> anyhow::Result<()> {
    let shared = SharedState {
        router,
        sink: Arc::new(BotSink::new(bot.clone())),
        bot_username: me.user.username.as_deref().map(Arc::from),
    };

    let handler = Update::filter_message().endpoint(handle_message);

    info!("telegram dispatcher starting");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![shared])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("telegram dispatcher stopped");
    Ok(())
}

/// Route one event and deliver the reply, if any.
///
/// Delivery failures are logged and reported in the outcome, never retried.
pub async fn handle_event(
    router: &MessageRouter,
    sink: &dyn ReplySink,
    event: &InboundEvent,
) -> HandleOutcome {
    let (route, reply) = router.dispatch(event);
    let Some(reply) = reply else {
        debug!(chat_id = event.sender.0, "command ignored");
        return HandleOutcome::Ignored;
    };

    match sink.deliver(&reply).await {
        Ok(()) => {
            debug!(chat_id = reply.target.0, ?route, "reply sent");
            HandleOutcome::Delivered(route)
        }
        Err(e) => {
            warn!(chat_id = reply.target.0, ?route, error = %e, "failed to send reply");
            HandleOutcome::DeliveryFailed(route)
        }
    }
}

// ---------------------------------------------------------------------------
// Message handler
// ---------------------------------------------------------------------------

async fn handle_message(msg: Message, state: SharedState) -> ResponseResult<()> {
    let Some(event) = inbound::event_from_message(&msg, state.bot_username.as_deref()) else {
        debug!(chat_id = msg.chat.id.0, "service message or other bot's command, ignoring");
        return Ok(());
    };

    debug!(chat_id = event.sender.0, "telegram message received");
    handle_event(&state.router, state.sink.as_ref(), &event).await;
    Ok(())
}
