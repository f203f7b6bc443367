//! Axum route handlers for the chat assistant.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assistant::session::ChatSession;
use crate::errors::AppError;
use crate::models::chat::ChatMessage;
use crate::models::cv::Cv;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub message: ChatMessage,
    pub cv: Cv,
}

/// POST /api/v1/chat/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<ChatSession>) {
    (StatusCode::CREATED, Json(state.chat.create_session().await))
}

/// GET /api/v1/chat/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatSession>, AppError> {
    Ok(Json(state.chat.session(id).await?))
}

/// DELETE /api/v1/chat/sessions/:id
/// Clears the conversation back to the greeting; the session id stays valid.
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatSession>, AppError> {
    Ok(Json(state.chat.reset_session(id).await?))
}

/// POST /api/v1/chat/sessions/:id/messages
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    Ok(Json(state.chat.send_message(id, &req.content).await?))
}

/// POST /api/v1/chat/sessions/:id/messages/:message_id/apply
pub async fn handle_apply_changes(
    State(state): State<AppState>,
    Path((id, message_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApplyResponse>, AppError> {
    let (message, cv) = state.chat.apply(id, message_id).await?;
    Ok(Json(ApplyResponse { message, cv }))
}

/// POST /api/v1/chat/sessions/:id/messages/:message_id/skip
pub async fn handle_skip_changes(
    State(state): State<AppState>,
    Path((id, message_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ChatMessage>, AppError> {
    Ok(Json(state.chat.skip(id, message_id).await?))
}
