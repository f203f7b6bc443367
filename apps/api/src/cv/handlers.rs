use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::cv::actions::CvAction;
use crate::cv::language::{detect_language, LanguageTag};
use crate::cv::transfer::{export_filename, export_json, import_json};
use crate::errors::AppError;
use crate::models::cv::Cv;
use crate::state::AppState;

#[derive(Serialize)]
pub struct LanguageResponse {
    pub language: LanguageTag,
}

/// GET /api/v1/cv
pub async fn handle_get_cv(State(state): State<AppState>) -> Json<Cv> {
    Json(state.cv.current().await)
}

/// POST /api/v1/cv/actions
pub async fn handle_cv_action(
    State(state): State<AppState>,
    Json(action): Json<CvAction>,
) -> Result<Json<Cv>, AppError> {
    Ok(Json(state.cv.dispatch(action).await?))
}

/// POST /api/v1/cv/reset
pub async fn handle_reset_cv(State(state): State<AppState>) -> Result<Json<Cv>, AppError> {
    Ok(Json(state.cv.dispatch(CvAction::Reset).await?))
}

/// GET /api/v1/cv/export
pub async fn handle_export_cv(State(state): State<AppState>) -> Result<Response, AppError> {
    let cv = state.cv.current().await;
    let body = export_json(&cv).map_err(|e| AppError::Internal(e.into()))?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(&cv));
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// POST /api/v1/cv/import
/// The body is read as text so malformed JSON is reported like any other invalid file.
pub async fn handle_import_cv(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Cv>, AppError> {
    let cv = import_json(&body)?;
    Ok(Json(state.cv.dispatch(CvAction::Replace { cv }).await?))
}

/// GET /api/v1/cv/language
pub async fn handle_cv_language(State(state): State<AppState>) -> Json<LanguageResponse> {
    let cv = state.cv.current().await;
    Json(LanguageResponse {
        language: detect_language(&cv),
    })
}
