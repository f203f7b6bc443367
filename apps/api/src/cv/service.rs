//! Owner of the single live CV.
//!
//! Every mutation goes through `dispatch`: the reducer computes the next
//! value, the store persists it, and only then is it swapped in. A failed
//! reduce or write leaves the live CV exactly as it was.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cv::actions::{reduce, CvAction};
use crate::errors::AppError;
use crate::models::cv::Cv;
use crate::store::{CvStore, StoreError};

/// A consistent view of the CV together with the generation it belongs to.
#[derive(Debug, Clone)]
pub struct CvSnapshot {
    pub cv: Cv,
    pub generation: u64,
}

struct LiveCv {
    cv: Cv,
    generation: u64,
}

pub struct CvService {
    live: Mutex<LiveCv>,
    store: Arc<dyn CvStore>,
}

impl CvService {
    /// Loads the persisted CV. An unreadable record is logged and replaced by
    /// the empty CV on the next write; a connection failure is fatal.
    pub async fn load(store: Arc<dyn CvStore>) -> Result<Self, StoreError> {
        let cv = match store.load().await {
            Ok(Some(cv)) => {
                info!("Loaded persisted CV");
                cv
            }
            Ok(None) => {
                info!("No persisted CV found, starting empty");
                Cv::default()
            }
            Err(StoreError::Corrupt(e)) => {
                warn!("Persisted CV could not be decoded, starting empty: {e}");
                Cv::default()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            live: Mutex::new(LiveCv { cv, generation: 0 }),
            store,
        })
    }

    pub async fn snapshot(&self) -> CvSnapshot {
        let live = self.live.lock().await;
        CvSnapshot {
            cv: live.cv.clone(),
            generation: live.generation,
        }
    }

    pub async fn current(&self) -> Cv {
        self.live.lock().await.cv.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.live.lock().await.generation
    }

    /// Applies one action atomically and returns the new CV.
    pub async fn dispatch(&self, action: CvAction) -> Result<Cv, AppError> {
        let mut live = self.live.lock().await;
        let new_generation = action.starts_new_generation();

        let next = reduce(&live.cv, action)?;
        self.store.save(&next).await?;

        live.cv = next.clone();
        if new_generation {
            live.generation += 1;
        }
        Ok(next)
    }
}
