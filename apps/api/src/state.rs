use std::sync::Arc;

use crate::assistant::service::ChatService;
use crate::config::Config;
use crate::cv::service::CvService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub cv: Arc<CvService>,
    pub chat: Arc<ChatService>,
    pub config: Config,
}
