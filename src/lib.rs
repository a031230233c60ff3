//! # linkshieldbot
//!
//! A Telegram bot that admits people to a chat only if they already belong
//! to a designated reference chat.
//!
//! - [`poller`]: long-polling loop, cursor tracking, per-update dispatch
//! - [`handlers`]: update router, join-request arbitration, `/start` greeting
//! - [`telegram`]: the Bot API methods the bot needs
//! - [`config`]: TOML configuration and the directive table

pub mod config;
pub mod handlers;
pub mod poller;
pub mod telegram;
