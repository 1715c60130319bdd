//! Point-in-time image of a post store and the port used to persist it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{entities::PostId, types::FeaturedMode};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to rebuild a [`PostStore`](super::store::PostStore).
///
/// Posts are kept in ascending id order. `featured` is only meaningful in
/// single mode and `starred` flags only in starred mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub mode: FeaturedMode,
    pub next_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<PostId>,
    #[serde(default)]
    pub posts: Vec<SnapshotPost>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPost {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author: String,
    pub timestamp: i64,
    #[serde(default)]
    pub starred: bool,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode snapshot: {0}")]
    Decode(String),
    #[error("failed to encode snapshot: {0}")]
    Encode(String),
}

/// Storage for store snapshots. `load` yields `None` when nothing was saved yet.
#[async_trait]
pub trait SnapshotRepo: Send + Sync {
    async fn load(&self) -> Result<Option<StoreSnapshot>, SnapshotError>;

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), SnapshotError>;
}
