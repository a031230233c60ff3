//! Minimal Telegram Bot API binding: the methods the moderator calls and
//! the objects it reads.

pub mod client;
pub mod error;
pub mod types;

pub use client::{TelegramApi, TelegramClient, DEFAULT_API_BASE};
pub use error::{TelegramError, TelegramResult};
pub use types::{
    Chat, ChatJoinRequest, ChatMember, ChatMemberStatus, JoinDecision, Message, ParseMode, Update,
    User,
};

#[cfg(test)]
pub use client::MockTelegramApi;
