//! Orchestrates chat rounds and proposal decisions across sessions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assistant::prompts::{build_system_prompt, EMPTY_REPLY, PROVIDER_FAILURE};
use crate::assistant::response_parser::parse_model_response;
use crate::assistant::session::{ChatSession, Decision, LifecycleError, RoundTicket};
use crate::cv::actions::CvAction;
use crate::cv::language::detect_language;
use crate::cv::masking::mask_pii;
use crate::cv::service::CvService;
use crate::errors::AppError;
use crate::llm_client::{CompletionBackend, CompletionRequest};
use crate::models::chat::ChatMessage;
use crate::models::cv::Cv;
use crate::models::patch::CvPatch;

/// Turns raw model output into the assistant message shown to the user.
/// Invalid or empty patches are not attached.
pub fn assistant_reply(raw: &str) -> ChatMessage {
    let parsed = parse_model_response(raw);
    let content = parsed.message.unwrap_or_else(|| EMPTY_REPLY.to_string());

    let patch = parsed
        .proposed_changes
        .and_then(|value| match CvPatch::from_untrusted(value) {
            Ok(patch) if patch.is_empty() => None,
            Ok(patch) => Some(patch),
            Err(e) => {
                warn!("Discarding malformed proposed changes: {e}");
                None
            }
        });

    ChatMessage::assistant(content, patch)
}

fn system_prompt(cv: &Cv) -> Result<String, AppError> {
    let masked = serde_json::to_string_pretty(&mask_pii(cv))
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(build_system_prompt(detect_language(cv), &masked))
}

type SessionMap = HashMap<Uuid, ChatSession>;

/// Frees the session if a round's future is dropped before the reply lands.
struct RoundGuard {
    sessions: Arc<Mutex<SessionMap>>,
    ticket: Option<RoundTicket>,
}

impl RoundGuard {
    fn disarm(&mut self) {
        self.ticket = None;
    }
}

fn abandon(sessions: &mut SessionMap, ticket: &RoundTicket) {
    let freed = sessions
        .get_mut(&ticket.session_id)
        .is_some_and(|session| session.abandon_round(ticket));
    if freed {
        info!("Round for session {} abandoned", ticket.session_id);
    }
}

impl Drop for RoundGuard {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        if let Ok(mut sessions) = self.sessions.try_lock() {
            abandon(&mut sessions, &ticket);
            return;
        }
        let sessions = self.sessions.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { abandon(&mut *sessions.lock().await, &ticket) });
            }
            Err(_) => warn!(
                "Could not free session {} after a dropped round",
                ticket.session_id
            ),
        }
    }
}

pub struct ChatService {
    sessions: Arc<Mutex<SessionMap>>,
    /// Serializes proposal decisions and session resets.
    decisions: Mutex<()>,
    backend: Option<Arc<dyn CompletionBackend>>,
    cv: Arc<CvService>,
}

impl ChatService {
    /// `backend` is `None` when no AI provider is configured; rounds are then refused.
    pub fn new(cv: Arc<CvService>, backend: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            decisions: Mutex::new(()),
            backend,
            cv,
        }
    }

    async fn with_session<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut ChatSession) -> Result<T, LifecycleError>,
    ) -> Result<T, LifecycleError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(LifecycleError::SessionNotFound(session_id))?;
        f(session)
    }

    pub async fn create_session(&self) -> ChatSession {
        let session = ChatSession::new();
        self.sessions
            .lock()
            .await
            .insert(session.id, session.clone());
        info!("Chat session {} created", session.id);
        session
    }

    pub async fn session(&self, session_id: Uuid) -> Result<ChatSession, LifecycleError> {
        self.with_session(session_id, |session| Ok(session.clone()))
            .await
    }

    pub async fn reset_session(&self, session_id: Uuid) -> Result<ChatSession, LifecycleError> {
        let _decisions = self.decisions.lock().await;
        self.with_session(session_id, |session| {
            session.reset();
            Ok(session.clone())
        })
        .await
    }

    /// Runs one round: user message in, assistant reply out.
    ///
    /// The model call happens with no lock held. A transport failure becomes
    /// an inline assistant message rather than an error. Dropping the future
    /// mid-round frees the session and discards the reply.
    pub async fn send_message(
        &self,
        session_id: Uuid,
        content: &str,
    ) -> Result<ChatMessage, AppError> {
        let backend = self.backend.as_ref().ok_or(AppError::AiNotConfigured)?;

        let snapshot = self.cv.snapshot().await;
        let system = system_prompt(&snapshot.cv)?;

        let ticket = self
            .with_session(session_id, |session| {
                session.begin_round(content, snapshot.generation)
            })
            .await?;
        let mut round = RoundGuard {
            sessions: self.sessions.clone(),
            ticket: Some(ticket.clone()),
        };

        let request = CompletionRequest {
            system,
            turns: ticket.history.clone(),
        };
        let reply = match backend.complete(&request).await {
            Ok(raw) => assistant_reply(&raw),
            Err(e) => {
                warn!("AI provider call failed for session {session_id}: {e}");
                ChatMessage::assistant(format!("⚠️ {PROVIDER_FAILURE}"), None)
            }
        };

        // Lock order: sessions, then the live CV.
        let mut sessions = self.sessions.lock().await;
        let cv_generation = self.cv.generation().await;
        round.disarm();
        let session = sessions
            .get_mut(&ticket.session_id)
            .ok_or(LifecycleError::SessionNotFound(ticket.session_id))?;
        let reply = session.finish_round(&ticket, cv_generation, reply);
        if reply.is_err() {
            info!("Dropping stale reply for session {session_id}");
        }
        Ok(reply?)
    }

    /// Merges a pending proposal into the live CV, then marks it applied.
    /// Returns the resolved message and the new CV.
    ///
    /// The sessions lock is released while the CV is written, so other
    /// sessions stay responsive during a slow save.
    pub async fn apply(
        &self,
        session_id: Uuid,
        message_id: Uuid,
    ) -> Result<(ChatMessage, Cv), AppError> {
        let _decisions = self.decisions.lock().await;
        let patch = self
            .with_session(session_id, |session| session.pending_patch(message_id))
            .await?;
        let cv = self.cv.dispatch(CvAction::ApplyPatch { patch }).await?;
        let message = self
            .with_session(session_id, |session| {
                session.resolve(message_id, Decision::Apply)
            })
            .await?;
        info!("Applied proposed changes from message {message_id}");
        Ok((message, cv))
    }

    pub async fn skip(&self, session_id: Uuid, message_id: Uuid) -> Result<ChatMessage, AppError> {
        let _decisions = self.decisions.lock().await;
        Ok(self
            .with_session(session_id, |session| {
                session.resolve(message_id, Decision::Skip)
            })
            .await?)
    }
}
