use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tracing::trace;

use super::error::{TelegramError, TelegramResult};
use super::types::{ChatMember, JoinDecision, Message, ParseMode, Update, User};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// The slice of the Bot API the moderator depends on.
///
/// Production code uses [`TelegramClient`]; tests provide their own
/// implementation. Deadlines and cancellation are applied by the caller by
/// wrapping the returned future, dropping it aborts the request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelegramApi: Send + Sync {
    /// https://core.telegram.org/bots/api#getme
    async fn get_me(&self) -> TelegramResult<User>;

    /// https://core.telegram.org/bots/api#getupdates
    ///
    /// `offset` of `None` lets the server start from the oldest unconfirmed update.
    async fn get_updates(
        &self,
        offset: Option<i64>,
        limit: Option<u32>,
        long_poll_secs: u64,
    ) -> TelegramResult<Vec<Update>>;

    /// https://core.telegram.org/bots/api#sendmessage
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> TelegramResult<Message>;

    /// https://core.telegram.org/bots/api#getchatmember
    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> TelegramResult<ChatMember>;

    /// Approves or declines a pending join request.
    ///
    /// `Ok(false)` means the server accepted the call but did nothing, e.g.
    /// because the request was already resolved.
    async fn set_join_decision(
        &self,
        chat_id: i64,
        user_id: i64,
        decision: JoinDecision,
    ) -> TelegramResult<bool>;
}

/// Response envelope shared by every Bot API method.
#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    result: Option<T>,
}

#[derive(Serialize)]
struct GetUpdatesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    timeout: u64,
    allowed_updates: [&'static str; 2],
}

#[derive(Serialize)]
struct SendMessageParams<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
}

/// Bot API client over a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    bot_token: String,
    api_base: String,
}

impl TelegramClient {
    pub fn new(bot_token: impl Into<String>) -> TelegramResult<Self> {
        Self::with_api_base(bot_token, DEFAULT_API_BASE)
    }

    /// Create a client talking to a self-hosted Bot API server (or a test double).
    pub fn with_api_base(
        bot_token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> TelegramResult<Self> {
        // Redirect targets would carry the token in their URL.
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            bot_token: bot_token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Bot token with everything but the edges hidden.
    pub fn bot_token_masked(&self) -> String {
        let chars: Vec<char> = self.bot_token.chars().collect();
        if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        } else {
            "****".to_string()
        }
    }

    async fn call<P, T>(&self, method: &str, params: &P) -> TelegramResult<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/bot{}/{}", self.api_base, self.bot_token, method);
        trace!(method, "bot api request");

        let resp = self.client.post(&url).json(params).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        decode_response(status, &body)
    }
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .field("bot_token", &self.bot_token_masked())
            .finish_non_exhaustive()
    }
}

/// Unwrap a Bot API envelope into its result or a structured failure.
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> TelegramResult<T> {
    let envelope: ApiResponse<T> = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        // Proxies and outages answer with HTML, keep the HTTP status instead.
        Err(_) if !status.is_success() => {
            return Err(TelegramError::Api {
                code: i64::from(status.as_u16()),
                description: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }
        Err(e) => return Err(TelegramError::Decode(e)),
    };

    if !envelope.ok {
        return Err(TelegramError::Api {
            code: envelope
                .error_code
                .unwrap_or_else(|| i64::from(status.as_u16())),
            description: envelope.description.unwrap_or_default(),
        });
    }

    envelope.result.ok_or_else(|| {
        TelegramError::Decode(<serde_json::Error as serde::de::Error>::custom(
            "missing `result` in successful response",
        ))
    })
}

#[async_trait]
impl TelegramApi for TelegramClient {
    async fn get_me(&self) -> TelegramResult<User> {
        self.call("getMe", &json!({})).await
    }

    async fn get_updates(
        &self,
        offset: Option<i64>,
        limit: Option<u32>,
        long_poll_secs: u64,
    ) -> TelegramResult<Vec<Update>> {
        let params = GetUpdatesParams {
            offset,
            limit,
            timeout: long_poll_secs,
            allowed_updates: ["message", "chat_join_request"],
        };
        self.call("getUpdates", &params).await
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> TelegramResult<Message> {
        let params = SendMessageParams {
            chat_id,
            text,
            parse_mode,
        };
        self.call("sendMessage", &params).await
    }

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> TelegramResult<ChatMember> {
        let params = json!({ "chat_id": chat_id, "user_id": user_id });
        self.call("getChatMember", &params).await
    }

    async fn set_join_decision(
        &self,
        chat_id: i64,
        user_id: i64,
        decision: JoinDecision,
    ) -> TelegramResult<bool> {
        let params = json!({ "chat_id": chat_id, "user_id": user_id });
        self.call(decision.api_method(), &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_unwraps_result() {
        let body = br#"{"ok":true,"result":true}"#;
        let ok: bool = decode_response(StatusCode::OK, body).unwrap();
        assert!(ok);
    }

    #[test]
    fn decode_surfaces_api_error() {
        let body = br#"{"ok":false,"error_code":400,"description":"Bad Request: USER_ALREADY_PARTICIPANT"}"#;
        let err = decode_response::<bool>(StatusCode::BAD_REQUEST, body).unwrap_err();
        match err {
            TelegramError::Api { code, description } => {
                assert_eq!(code, 400);
                assert_eq!(description, "Bad Request: USER_ALREADY_PARTICIPANT");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_non_json_error_page_keeps_status() {
        let err = decode_response::<bool>(StatusCode::BAD_GATEWAY, b"<html>502</html>").unwrap_err();
        assert_eq!(err.api_code(), Some(502));
    }

    #[test]
    fn decode_garbage_with_success_status_is_decode_error() {
        let err = decode_response::<bool>(StatusCode::OK, b"not json").unwrap_err();
        assert!(matches!(err, TelegramError::Decode(_)));
    }

    #[test]
    fn decode_missing_result_is_decode_error() {
        let err = decode_response::<bool>(StatusCode::OK, br#"{"ok":true}"#).unwrap_err();
        assert!(matches!(err, TelegramError::Decode(_)));
    }

    #[test]
    fn debug_output_masks_token() {
        let client = TelegramClient::new("123456:ABCDEFGHIJKLMNOP").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("ABCDEFGHIJKLMNOP"));
        assert!(debug.contains("1234...MNOP"));
    }

    #[test]
    fn masking_respects_char_boundaries() {
        let client = TelegramClient::new("aéé-123456789").unwrap();
        assert_eq!(client.bot_token_masked(), "aéé-...6789");
        assert!(format!("{client:?}").contains("aéé-...6789"));

        let short = TelegramClient::new("éééé").unwrap();
        assert_eq!(short.bot_token_masked(), "****");
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let client = TelegramClient::with_api_base("t", "http://localhost:8081/").unwrap();
        assert_eq!(client.api_base, "http://localhost:8081");
    }
}
