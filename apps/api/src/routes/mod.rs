pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assistant::handlers as chat;
use crate::cv::handlers as cv;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // CV API
        .route("/api/v1/cv", get(cv::handle_get_cv))
        .route("/api/v1/cv/actions", post(cv::handle_cv_action))
        .route("/api/v1/cv/reset", post(cv::handle_reset_cv))
        .route("/api/v1/cv/export", get(cv::handle_export_cv))
        .route("/api/v1/cv/import", post(cv::handle_import_cv))
        .route("/api/v1/cv/language", get(cv::handle_cv_language))
        // Chat API
        .route("/api/v1/chat/sessions", post(chat::handle_create_session))
        .route(
            "/api/v1/chat/sessions/:id",
            get(chat::handle_get_session).delete(chat::handle_reset_session),
        )
        .route(
            "/api/v1/chat/sessions/:id/messages",
            post(chat::handle_send_message),
        )
        .route(
            "/api/v1/chat/sessions/:id/messages/:message_id/apply",
            post(chat::handle_apply_changes),
        )
        .route(
            "/api/v1/chat/sessions/:id/messages/:message_id/skip",
            post(chat::handle_skip_changes),
        )
        .with_state(state)
}
