//! Update routing and the handlers behind it.

mod error;
pub mod join_request;
pub mod start;

pub use error::HandlerError;
pub use join_request::{arbitrate, decide, JoinOutcome};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::DirectiveTable;
use crate::poller::UpdateHandler;
use crate::telegram::{ChatJoinRequest, Message, TelegramApi, Update};

/// The handler an update is routed to.
#[derive(Debug, PartialEq)]
pub enum Route<'a> {
    Start(&'a Message),
    JoinRequest(&'a ChatJoinRequest),
    Ignore,
}

/// Classify an update. Pure: no I/O, no shared state.
pub fn route(update: &Update) -> Route<'_> {
    if let Some(msg) = &update.message {
        if msg.chat.is_private() && msg.text.as_deref() == Some(start::START_COMMAND) {
            return Route::Start(msg);
        }
        return Route::Ignore;
    }

    match &update.chat_join_request {
        Some(req) => Route::JoinRequest(req),
        None => Route::Ignore,
    }
}

/// Production [`UpdateHandler`]: routes each update and runs its handler.
pub struct Moderator {
    directives: Arc<DirectiveTable>,
}

impl Moderator {
    pub fn new(directives: Arc<DirectiveTable>) -> Self {
        Self { directives }
    }
}

#[async_trait]
impl UpdateHandler for Moderator {
    async fn handle(&self, api: &dyn TelegramApi, update: Update) -> Result<(), HandlerError> {
        match route(&update) {
            Route::Start(msg) => start::reply_to_start(api, msg).await,
            Route::JoinRequest(req) => arbitrate(api, &self.directives, req).await.map(|_| ()),
            Route::Ignore => Ok(()),
        }
    }
}
