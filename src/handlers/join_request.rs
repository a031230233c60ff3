//! Join-request arbitration: approve members of the reference chat, decline
//! everyone else.

use tracing::{debug, info};

use super::HandlerError;
use crate::config::DirectiveTable;
use crate::telegram::{ChatJoinRequest, ChatMemberStatus, JoinDecision, TelegramApi};

/// What happened to one join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// No directive exists for the chat; nothing was called.
    Unmoderated,
    /// The decision was applied.
    Applied(JoinDecision),
    /// The server accepted the call but reported a no-op (already resolved).
    AlreadyResolved(JoinDecision),
}

/// Whitelist policy: only statuses that prove membership approve.
pub fn decide(status: ChatMemberStatus) -> JoinDecision {
    match status {
        ChatMemberStatus::Member
        | ChatMemberStatus::Creator
        | ChatMemberStatus::Administrator
        | ChatMemberStatus::Restricted => JoinDecision::Approve,
        ChatMemberStatus::Left | ChatMemberStatus::Kicked | ChatMemberStatus::Unknown => {
            JoinDecision::Decline
        }
    }
}

/// Resolve one join request, issuing at most one approve/decline call.
///
/// Failures leave the request pending on the server; they are not retried here.
pub async fn arbitrate(
    api: &dyn TelegramApi,
    directives: &DirectiveTable,
    req: &ChatJoinRequest,
) -> Result<JoinOutcome, HandlerError> {
    let chat_id = req.chat.id;
    let user_id = req.from.id;

    let Some(reference_chat) = directives.reference_chat(chat_id) else {
        debug!(
            "Received join request but directive is missing for chat, skipping.. (chat_id={})",
            chat_id
        );
        return Ok(JoinOutcome::Unmoderated);
    };

    debug!(
        "Received join request (chat_id={}, user_id={})",
        chat_id, user_id
    );

    let member = api
        .get_chat_member(reference_chat, user_id)
        .await
        .map_err(|source| HandlerError::GetChatMember {
            chat_id: reference_chat,
            user_id,
            source,
        })?;

    let decision = decide(member.status);
    debug!(
        "User {} is {} in reference chat {}, decision: {}",
        user_id, member.status, reference_chat, decision
    );

    let applied = api
        .set_join_decision(chat_id, user_id, decision)
        .await
        .map_err(|source| HandlerError::JoinDecision {
            decision,
            chat_id,
            user_id,
            source,
        })?;

    if !applied {
        info!(
            "Couldn't {} user {} in chat {}, maybe already resolved?",
            decision, user_id, chat_id
        );
        return Ok(JoinOutcome::AlreadyResolved(decision));
    }

    debug!(
        "Join request {}d (chat_id={}, user_id={})",
        decision, chat_id, user_id
    );
    Ok(JoinOutcome::Applied(decision))
}
