use std::time::Duration;
use thiserror::Error;

/// Result type alias for Bot API calls.
pub type TelegramResult<T> = std::result::Result<T, TelegramError>;

/// Failure of a single Bot API call.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The caller's cancellation signal fired while the call was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before a response arrived.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Network-level failure. The request URL is stripped so the bot token
    /// never ends up in logs.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// The Bot API answered with `ok: false`.
    #[error("api error {code}: \"{description}\"")]
    Api { code: i64, description: String },

    /// The response body was not a valid Bot API envelope.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        TelegramError::Transport(err.without_url())
    }
}

impl TelegramError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TelegramError::Cancelled)
    }

    /// Application-level code returned by the Bot API, if any.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            TelegramError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
