use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::cv::Cv;
use crate::store::{decode, encode, CvStore, StoreError};

/// Process-local store used when no Redis URL is configured, and in tests.
/// Keeps the encoded record so reads go through the same decoding path.
#[derive(Default)]
pub struct MemoryCvStore {
    record: RwLock<Option<String>>,
}

impl MemoryCvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with a raw persisted record.
    pub fn with_record(raw: impl Into<String>) -> Self {
        Self {
            record: RwLock::new(Some(raw.into())),
        }
    }
}

#[async_trait]
impl CvStore for MemoryCvStore {
    async fn load(&self) -> Result<Option<Cv>, StoreError> {
        self.record.read().await.as_deref().map(decode).transpose()
    }

    async fn save(&self, cv: &Cv) -> Result<(), StoreError> {
        let encoded = encode(cv)?;
        *self.record.write().await = Some(encoded);
        Ok(())
    }
}
