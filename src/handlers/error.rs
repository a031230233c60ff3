use std::time::Duration;
use thiserror::Error;

use crate::telegram::{JoinDecision, TelegramError};

/// Failure of one dispatched update. Never affects sibling dispatches or the poller.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to get chat member (chat_id={chat_id}, user_id={user_id}): {source}")]
    GetChatMember {
        chat_id: i64,
        user_id: i64,
        source: TelegramError,
    },

    #[error("failed to {decision} join request (chat_id={chat_id}, user_id={user_id}): {source}")]
    JoinDecision {
        decision: JoinDecision,
        chat_id: i64,
        user_id: i64,
        source: TelegramError,
    },

    #[error("failed to reply to /start (chat_id={chat_id}): {source}")]
    Greeting { chat_id: i64, source: TelegramError },

    #[error("handler timed out after {0:?}")]
    Timeout(Duration),

    #[error("handler cancelled")]
    Cancelled,
}

impl HandlerError {
    /// True when the failure is the shutdown signal rather than a real error.
    pub fn is_cancelled(&self) -> bool {
        match self {
            HandlerError::Cancelled => true,
            HandlerError::GetChatMember { source, .. }
            | HandlerError::JoinDecision { source, .. }
            | HandlerError::Greeting { source, .. } => source.is_cancelled(),
            HandlerError::Timeout(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_cancellation_is_cancellation() {
        let err = HandlerError::GetChatMember {
            chat_id: 200,
            user_id: 42,
            source: TelegramError::Cancelled,
        };
        assert!(err.is_cancelled());
        assert!(!HandlerError::Timeout(Duration::from_secs(20)).is_cancelled());
    }

    #[test]
    fn display_names_the_failing_step() {
        let err = HandlerError::JoinDecision {
            decision: JoinDecision::Decline,
            chat_id: 100,
            user_id: 42,
            source: TelegramError::Api {
                code: 403,
                description: "Forbidden".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "failed to decline join request (chat_id=100, user_id=42): api error 403: \"Forbidden\""
        );
    }
}
