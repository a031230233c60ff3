use tracing::debug;

use super::HandlerError;
use crate::telegram::{Message, ParseMode, TelegramApi};

pub const START_COMMAND: &str = "/start";

pub const GREETING: &str = "Hey there! I'm a private instance of \
<a href=\"https://t.me/LinkShieldBot\">LinkShieldBot</a> - \
a bot to filter unwanted chat join requests.\n\
Check my channel out to learn more or run your own instance.";

/// Reply to a private `/start` with the static greeting.
pub async fn reply_to_start(api: &dyn TelegramApi, msg: &Message) -> Result<(), HandlerError> {
    debug!("Received /start command (user_id={})", msg.chat.id);

    api.send_message(msg.chat.id, GREETING, Some(ParseMode::Html))
        .await
        .map_err(|source| HandlerError::Greeting {
            chat_id: msg.chat.id,
            source,
        })?;

    Ok(())
}
