//! Bot API objects, limited to the fields the moderator reads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// https://core.telegram.org/bots/api#update
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub chat_join_request: Option<ChatJoinRequest>,
}

/// https://core.telegram.org/bots/api#message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

/// https://core.telegram.org/bots/api#chatjoinrequest
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatJoinRequest {
    pub chat: Chat,
    pub from: User,
}

/// https://core.telegram.org/bots/api#chat
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl Chat {
    pub fn is_private(&self) -> bool {
        self.kind == "private"
    }
}

/// https://core.telegram.org/bots/api#user
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// https://core.telegram.org/bots/api#chatmember
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatMember {
    #[serde(default)]
    pub status: ChatMemberStatus,
    #[serde(default)]
    pub user: Option<User>,
}

/// Standing of a user in a chat.
///
/// Anything outside the documented vocabulary (including an empty string)
/// deserializes to [`ChatMemberStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ChatMemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMemberStatus::Creator => "creator",
            ChatMemberStatus::Administrator => "administrator",
            ChatMemberStatus::Member => "member",
            ChatMemberStatus::Restricted => "restricted",
            ChatMemberStatus::Left => "left",
            ChatMemberStatus::Kicked => "kicked",
            ChatMemberStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChatMemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome issued for a pending join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDecision {
    Approve,
    Decline,
}

impl JoinDecision {
    /// Bot API method carrying this decision.
    pub fn api_method(&self) -> &'static str {
        match self {
            JoinDecision::Approve => "approveChatJoinRequest",
            JoinDecision::Decline => "declineChatJoinRequest",
        }
    }
}

impl fmt::Display for JoinDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinDecision::Approve => f.write_str("approve"),
            JoinDecision::Decline => f.write_str("decline"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}
