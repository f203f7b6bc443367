//! Durable mirror of the CV aggregate.
//!
//! The whole CV is one JSON value stored under a single namespace key. The
//! live copy is owned by `CvService`; stores only read it at startup and
//! receive a full write after every mutation.

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::cv::Cv;

pub use memory::MemoryCvStore;
pub use self::redis::RedisCvStore;

/// Default namespace key for the persisted CV.
pub const DEFAULT_STORAGE_KEY: &str = "cv-storage";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Persisted CV is not valid JSON: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Failed to serialize CV: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[async_trait]
pub trait CvStore: Send + Sync {
    /// Returns the persisted CV, or `None` when nothing was stored yet.
    async fn load(&self) -> Result<Option<Cv>, StoreError>;

    /// Overwrites the persisted CV.
    async fn save(&self, cv: &Cv) -> Result<(), StoreError>;
}

/// Decodes a persisted record. Missing top-level sections default to empty.
pub(crate) fn decode(raw: &str) -> Result<Cv, StoreError> {
    serde_json::from_str(raw).map_err(StoreError::Corrupt)
}

pub(crate) fn encode(cv: &Cv) -> Result<String, StoreError> {
    serde_json::to_string(cv).map_err(StoreError::Serialize)
}
