use async_trait::async_trait;
use ::redis::aio::MultiplexedConnection;
use ::redis::AsyncCommands;
use tracing::{debug, info};

use crate::models::cv::Cv;
use crate::store::{decode, encode, CvStore, StoreError};

/// Redis-backed store. The CV lives as a JSON string under one key:
///
/// ```text
/// {storage_key} -> "{...cv json...}"
/// ```
#[derive(Clone)]
pub struct RedisCvStore {
    connection: MultiplexedConnection,
    key: String,
}

impl RedisCvStore {
    pub async fn connect(url: &str, key: impl Into<String>) -> Result<Self, StoreError> {
        let client = ::redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        let key = key.into();
        info!("Redis CV store connected (key: {key})");
        Ok(Self { connection, key })
    }
}

#[async_trait]
impl CvStore for RedisCvStore {
    async fn load(&self) -> Result<Option<Cv>, StoreError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(&self.key).await?;
        debug!("Loaded CV record from Redis (present: {})", raw.is_some());
        raw.as_deref().map(decode).transpose()
    }

    async fn save(&self, cv: &Cv) -> Result<(), StoreError> {
        let encoded = encode(cv)?;
        let mut conn = self.connection.clone();
        conn.set::<_, _, ()>(&self.key, encoded).await?;
        Ok(())
    }
}
