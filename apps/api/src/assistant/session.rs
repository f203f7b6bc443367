//! Chat session state machine.
//!
//! A session admits one in-flight model round at a time. Each round carries
//! a `RoundTicket` recording the session and CV generations it started
//! under; a reply whose ticket no longer matches is discarded.
//!
//! Proposals move `Pending -> Applied` or `Pending -> Skipped` exactly once.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::assistant::prompts::GREETING;
use crate::llm_client::ChatTurn;
use crate::models::chat::{ChangeStatus, ChatMessage};
use crate::models::patch::CvPatch;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("chat session {0} not found")]
    SessionNotFound(Uuid),

    #[error("message {0} not found")]
    MessageNotFound(Uuid),

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("a reply is already being generated for this session")]
    Busy,

    #[error("message {0} carries no proposed changes")]
    NoProposal(Uuid),

    #[error("proposed changes were already {}", status_label(.0))]
    AlreadyResolved(ChangeStatus),

    #[error("the conversation or CV changed while the reply was generated")]
    Stale,
}

fn status_label(status: &ChangeStatus) -> &'static str {
    match status {
        ChangeStatus::Pending => "pending",
        ChangeStatus::Applied => "applied",
        ChangeStatus::Skipped => "skipped",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Apply,
    Skip,
}

impl Decision {
    fn status(self) -> ChangeStatus {
        match self {
            Decision::Apply => ChangeStatus::Applied,
            Decision::Skip => ChangeStatus::Skipped,
        }
    }
}

/// Captured when a round starts; presented again when it finishes.
#[derive(Debug, Clone)]
pub struct RoundTicket {
    pub session_id: Uuid,
    pub session_generation: u64,
    pub cv_generation: u64,
    /// Conversation as sent to the model, greeting excluded.
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub busy: bool,
    #[serde(skip)]
    greeting_id: Uuid,
    #[serde(skip)]
    generation: u64,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        let greeting = ChatMessage::assistant(GREETING, None);
        Self {
            id: Uuid::new_v4(),
            greeting_id: greeting.id,
            messages: vec![greeting],
            busy: false,
            generation: 0,
        }
    }

    fn history(&self) -> Vec<ChatTurn> {
        self.messages
            .iter()
            .filter(|m| m.id != self.greeting_id)
            .map(|m| ChatTurn {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    /// Appends the user's message and marks the session busy.
    pub fn begin_round(
        &mut self,
        content: &str,
        cv_generation: u64,
    ) -> Result<RoundTicket, LifecycleError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(LifecycleError::EmptyMessage);
        }
        if self.busy {
            return Err(LifecycleError::Busy);
        }

        self.messages.push(ChatMessage::user(content));
        self.busy = true;

        Ok(RoundTicket {
            session_id: self.id,
            session_generation: self.generation,
            cv_generation,
            history: self.history(),
        })
    }

    /// Completes a round. A ticket from before a session reset is ignored
    /// entirely; a ticket from before a CV reset or import frees the session
    /// but drops the reply.
    pub fn finish_round(
        &mut self,
        ticket: &RoundTicket,
        current_cv_generation: u64,
        reply: ChatMessage,
    ) -> Result<ChatMessage, LifecycleError> {
        if ticket.session_generation != self.generation {
            return Err(LifecycleError::Stale);
        }
        self.busy = false;
        if ticket.cv_generation != current_cv_generation {
            return Err(LifecycleError::Stale);
        }

        self.messages.push(reply.clone());
        Ok(reply)
    }

    /// Frees the session when a round ends without a reply, e.g. the
    /// request was dropped. The ticket can no longer finish afterwards.
    /// Returns false when the ticket was already stale.
    pub fn abandon_round(&mut self, ticket: &RoundTicket) -> bool {
        if ticket.session_generation != self.generation || !self.busy {
            return false;
        }
        self.busy = false;
        self.generation += 1;
        true
    }

    fn message(&self, message_id: Uuid) -> Result<&ChatMessage, LifecycleError> {
        self.messages
            .iter()
            .find(|m| m.id == message_id)
            .ok_or(LifecycleError::MessageNotFound(message_id))
    }

    /// The patch awaiting a decision on `message_id`.
    pub fn pending_patch(&self, message_id: Uuid) -> Result<CvPatch, LifecycleError> {
        let message = self.message(message_id)?;
        match (&message.proposed_changes, message.change_status) {
            (Some(_), Some(status)) if status.is_terminal() => {
                Err(LifecycleError::AlreadyResolved(status))
            }
            (Some(patch), _) => Ok(patch.clone()),
            (None, _) => Err(LifecycleError::NoProposal(message_id)),
        }
    }

    /// Records the user's decision. Only a pending proposal can be resolved.
    pub fn resolve(
        &mut self,
        message_id: Uuid,
        decision: Decision,
    ) -> Result<ChatMessage, LifecycleError> {
        self.pending_patch(message_id)?;
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or(LifecycleError::MessageNotFound(message_id))?;
        message.change_status = Some(decision.status());
        Ok(message.clone())
    }

    /// Back to the greeting. Any in-flight round becomes stale.
    pub fn reset(&mut self) {
        let greeting = ChatMessage::assistant(GREETING, None);
        self.greeting_id = greeting.id;
        self.messages = vec![greeting];
        self.busy = false;
        self.generation += 1;
    }
}
