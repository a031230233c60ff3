// Shared test doubles for the poller and moderation integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::error::Error;
use std::sync::Mutex;
use std::time::Duration;

use linkshieldbot::handlers::HandlerError;
use linkshieldbot::poller::{ErrorOrigin, ErrorSink, UpdateHandler};
use linkshieldbot::telegram::{
    Chat, ChatJoinRequest, ChatMember, ChatMemberStatus, JoinDecision, Message, ParseMode,
    TelegramApi, TelegramError, TelegramResult, Update, User,
};

/// Scripted Bot API double that records every call.
///
/// `get_updates` serves the scripted batches in order, then blocks forever
/// like a long poll with nothing to deliver.
pub struct ScriptedApi {
    batches: Mutex<VecDeque<TelegramResult<Vec<Update>>>>,
    members: HashMap<(i64, i64), ChatMemberStatus>,
    decision_applies: bool,
    send_fails: bool,
    pub fetch_offsets: Mutex<Vec<Option<i64>>>,
    pub member_lookups: Mutex<Vec<(i64, i64)>>,
    pub decisions: Mutex<Vec<(i64, i64, JoinDecision)>>,
    pub sent: Mutex<Vec<(i64, String, Option<ParseMode>)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(VecDeque::new()),
            members: HashMap::new(),
            decision_applies: true,
            send_fails: false,
            fetch_offsets: Mutex::new(Vec::new()),
            member_lookups: Mutex::new(Vec::new()),
            decisions: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_batch(self, batch: TelegramResult<Vec<Update>>) -> Self {
        self.batches.lock().unwrap().push_back(batch);
        self
    }

    pub fn with_member(mut self, chat_id: i64, user_id: i64, status: ChatMemberStatus) -> Self {
        self.members.insert((chat_id, user_id), status);
        self
    }

    /// Make approve/decline report a no-op, as for an already resolved request.
    pub fn already_resolved(mut self) -> Self {
        self.decision_applies = false;
        self
    }

    /// Make every `send_message` fail as if the user blocked the bot.
    pub fn send_fails(mut self) -> Self {
        self.send_fails = true;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_offsets.lock().unwrap().len()
    }

    pub fn decisions(&self) -> Vec<(i64, i64, JoinDecision)> {
        self.decisions.lock().unwrap().clone()
    }

    pub fn member_lookups(&self) -> Vec<(i64, i64)> {
        self.member_lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelegramApi for ScriptedApi {
    async fn get_me(&self) -> TelegramResult<User> {
        Ok(user(1))
    }

    async fn get_updates(
        &self,
        offset: Option<i64>,
        _limit: Option<u32>,
        _long_poll_secs: u64,
    ) -> TelegramResult<Vec<Update>> {
        self.fetch_offsets.lock().unwrap().push(offset);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => std::future::pending().await,
        }
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> TelegramResult<Message> {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id, text.to_string(), parse_mode));
        if self.send_fails {
            return Err(TelegramError::Api {
                code: 403,
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        Ok(Message {
            message_id: 1,
            from: None,
            chat: chat(chat_id, "private"),
            text: Some(text.to_string()),
        })
    }

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> TelegramResult<ChatMember> {
        self.member_lookups.lock().unwrap().push((chat_id, user_id));
        match self.members.get(&(chat_id, user_id)) {
            Some(status) => Ok(ChatMember {
                status: *status,
                user: Some(user(user_id)),
            }),
            None => Err(TelegramError::Api {
                code: 400,
                description: "Bad Request: PARTICIPANT_ID_INVALID".to_string(),
            }),
        }
    }

    async fn set_join_decision(
        &self,
        chat_id: i64,
        user_id: i64,
        decision: JoinDecision,
    ) -> TelegramResult<bool> {
        self.decisions
            .lock()
            .unwrap()
            .push((chat_id, user_id, decision));
        Ok(self.decision_applies)
    }
}

/// Error sink that keeps every report.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<(ErrorOrigin, String)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(ErrorOrigin, String)> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, origin: ErrorOrigin) -> usize {
        self.events().iter().filter(|(o, _)| *o == origin).count()
    }
}

impl ErrorSink for RecordingSink {
    fn report(&self, origin: ErrorOrigin, error: &(dyn Error + Send + Sync + 'static)) {
        self.events.lock().unwrap().push((origin, error.to_string()));
    }
}

/// Update handler that records ids, optionally failing or stalling on some.
#[derive(Default)]
pub struct RecordingHandler {
    pub seen: Mutex<Vec<i64>>,
    pub fail: Vec<i64>,
    pub stall: Option<Duration>,
}

impl RecordingHandler {
    pub fn seen(&self) -> Vec<i64> {
        let mut seen = self.seen.lock().unwrap().clone();
        seen.sort_unstable();
        seen
    }
}

#[async_trait]
impl UpdateHandler for RecordingHandler {
    async fn handle(&self, _api: &dyn TelegramApi, update: Update) -> Result<(), HandlerError> {
        self.seen.lock().unwrap().push(update.update_id);
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
        if self.fail.contains(&update.update_id) {
            return Err(HandlerError::Greeting {
                chat_id: update.update_id,
                source: TelegramError::Api {
                    code: 403,
                    description: "Forbidden: bot was blocked by the user".to_string(),
                },
            });
        }
        Ok(())
    }
}

/// Poll `cond` until it holds, panicking after two seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub fn user(id: i64) -> User {
    User {
        id,
        first_name: "Ada".to_string(),
        last_name: None,
        username: Some("ada".to_string()),
    }
}

pub fn chat(id: i64, kind: &str) -> Chat {
    Chat {
        id,
        kind: kind.to_string(),
        title: None,
    }
}

pub fn bare_update(update_id: i64) -> Update {
    Update {
        update_id,
        message: None,
        chat_join_request: None,
    }
}

pub fn join_request_update(update_id: i64, chat_id: i64, user_id: i64) -> Update {
    Update {
        update_id,
        message: None,
        chat_join_request: Some(ChatJoinRequest {
            chat: chat(chat_id, "supergroup"),
            from: user(user_id),
        }),
    }
}

pub fn text_update(update_id: i64, chat_id: i64, kind: &str, text: &str) -> Update {
    Update {
        update_id,
        message: Some(Message {
            message_id: update_id,
            from: Some(user(chat_id)),
            chat: chat(chat_id, kind),
            text: Some(text.to_string()),
        }),
        chat_join_request: None,
    }
}
