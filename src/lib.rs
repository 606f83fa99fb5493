//! DrugShift bot: a minimal Telegram bot.
//!
//! Greets users on `/start`, answers every plain text message with one fixed
//! reply, and ignores every other command. Routing is a pure function in
//! [`router`]; [`telegram`] binds it to teloxide.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod credentials;
pub mod logging;
pub mod router;
pub mod telegram;
