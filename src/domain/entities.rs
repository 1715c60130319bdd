//! Domain entities held by the post store.

use std::fmt;

use inkwell_api_types::PostResponse;
use serde::{Deserialize, Serialize};

/// Store-assigned post identifier. Never reused once issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(u64);

impl PostId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Caller-supplied fields of a post. Shared by create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub content: String,
    pub author: String,
}

impl PostContent {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author: author.into(),
        }
    }
}

/// Detached copy of a stored post, as handed out by queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author: String,
    /// Creation time in nanoseconds since the Unix epoch.
    pub timestamp: i64,
    /// `None` when the store runs in single-featured mode.
    pub starred: Option<bool>,
}

impl From<PostRecord> for PostResponse {
    fn from(record: PostRecord) -> Self {
        PostResponse {
            id: record.id.get(),
            title: record.title,
            content: record.content,
            author: record.author,
            timestamp: record.timestamp,
            starred: record.starred,
        }
    }
}
