//! The post store: the authoritative in-memory collection of posts.
//!
//! `PostStore` is plain data with `&mut self` mutations. Every operation runs to
//! completion without suspending and either applies fully or not at all, so a
//! caller that serialises access (see [`PostService`](super::posts::PostService))
//! never observes a half-applied change.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::application::snapshot::{SNAPSHOT_VERSION, SnapshotPost, StoreSnapshot};
use crate::domain::{
    entities::{PostContent, PostId, PostRecord},
    error::DomainError,
    types::FeaturedMode,
};

const FIRST_POST_ID: u64 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("post not found")]
    NotFound { id: PostId },
    #[error("`{operation}` is not available in {mode} mode")]
    UnsupportedOperation {
        operation: &'static str,
        mode: FeaturedMode,
    },
    #[error("post id space exhausted")]
    IdsExhausted,
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[source] DomainError),
}

impl StoreError {
    fn unsupported(operation: &'static str, mode: FeaturedMode) -> Self {
        Self::UnsupportedOperation { operation, mode }
    }

    fn invalid_snapshot(message: impl Into<String>) -> Self {
        Self::InvalidSnapshot(DomainError::invariant(message))
    }
}

#[derive(Debug, Clone)]
struct StoredPost {
    title: String,
    content: String,
    author: String,
    timestamp: i64,
}

#[derive(Debug, Clone)]
enum Highlight {
    Featured(Option<PostId>),
    Starred(BTreeSet<PostId>),
}

impl Highlight {
    fn new(mode: FeaturedMode) -> Self {
        match mode {
            FeaturedMode::Single => Highlight::Featured(None),
            FeaturedMode::Starred => Highlight::Starred(BTreeSet::new()),
        }
    }

    fn mode(&self) -> FeaturedMode {
        match self {
            Highlight::Featured(_) => FeaturedMode::Single,
            Highlight::Starred(_) => FeaturedMode::Starred,
        }
    }

    fn starred_flag(&self, id: PostId) -> Option<bool> {
        match self {
            Highlight::Featured(_) => None,
            Highlight::Starred(ids) => Some(ids.contains(&id)),
        }
    }

    /// Drop any status held by `id`; called with the removal of the post.
    fn forget(&mut self, id: PostId) {
        match self {
            Highlight::Featured(featured) => {
                if *featured == Some(id) {
                    *featured = None;
                }
            }
            Highlight::Starred(ids) => {
                ids.remove(&id);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostStore {
    posts: BTreeMap<PostId, StoredPost>,
    next_id: u64,
    highlight: Highlight,
}

impl PostStore {
    pub fn new(mode: FeaturedMode) -> Self {
        Self {
            posts: BTreeMap::new(),
            next_id: FIRST_POST_ID,
            highlight: Highlight::new(mode),
        }
    }

    pub fn featured_mode(&self) -> FeaturedMode {
        self.highlight.mode()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Allocate the next id and insert a new post stamped with `timestamp`.
    pub fn create_post(
        &mut self,
        content: PostContent,
        timestamp: i64,
    ) -> Result<PostId, StoreError> {
        let id = PostId::new(self.next_id);
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted)?;

        let PostContent {
            title,
            content,
            author,
        } = content;
        self.posts.insert(
            id,
            StoredPost {
                title,
                content,
                author,
                timestamp,
            },
        );
        self.next_id = next_id;
        Ok(id)
    }

    /// Replace title, content and author. Id and timestamp are kept.
    pub fn edit_post(&mut self, id: PostId, content: PostContent) -> Result<(), StoreError> {
        let post = self
            .posts
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;

        post.title = content.title;
        post.content = content.content;
        post.author = content.author;
        Ok(())
    }

    pub fn delete_post(&mut self, id: PostId) -> Result<(), StoreError> {
        if self.posts.remove(&id).is_none() {
            return Err(StoreError::NotFound { id });
        }
        self.highlight.forget(id);
        Ok(())
    }

    /// All posts, newest (highest id) first.
    pub fn posts(&self) -> Vec<PostRecord> {
        self.posts
            .iter()
            .rev()
            .map(|(id, post)| self.record(*id, post))
            .collect()
    }

    pub fn post(&self, id: PostId) -> Result<PostRecord, StoreError> {
        self.posts
            .get(&id)
            .map(|post| self.record(id, post))
            .ok_or(StoreError::NotFound { id })
    }

    /// The featured post (single mode) or every starred post, newest first.
    pub fn featured_posts(&self) -> Vec<PostRecord> {
        match &self.highlight {
            Highlight::Featured(featured) => featured
                .and_then(|id| self.posts.get(&id).map(|post| self.record(id, post)))
                .into_iter()
                .collect(),
            Highlight::Starred(ids) => ids
                .iter()
                .rev()
                .filter_map(|id| self.posts.get(id).map(|post| self.record(*id, post)))
                .collect(),
        }
    }

    /// Make `id` the featured post, replacing any previous one.
    pub fn set_featured_post(&mut self, id: PostId) -> Result<(), StoreError> {
        let Highlight::Featured(featured) = &mut self.highlight else {
            return Err(StoreError::unsupported(
                "setFeaturedPost",
                FeaturedMode::Starred,
            ));
        };
        if !self.posts.contains_key(&id) {
            return Err(StoreError::NotFound { id });
        }
        *featured = Some(id);
        Ok(())
    }

    pub fn clear_featured_post(&mut self) -> Result<(), StoreError> {
        let Highlight::Featured(featured) = &mut self.highlight else {
            return Err(StoreError::unsupported(
                "clearFeaturedPost",
                FeaturedMode::Starred,
            ));
        };
        *featured = None;
        Ok(())
    }

    pub fn star_post(&mut self, id: PostId) -> Result<(), StoreError> {
        self.set_starred(id, true, "starPost")
    }

    pub fn unstar_post(&mut self, id: PostId) -> Result<(), StoreError> {
        self.set_starred(id, false, "unstarPost")
    }

    fn set_starred(
        &mut self,
        id: PostId,
        starred: bool,
        operation: &'static str,
    ) -> Result<(), StoreError> {
        let Highlight::Starred(ids) = &mut self.highlight else {
            return Err(StoreError::unsupported(operation, FeaturedMode::Single));
        };
        if !self.posts.contains_key(&id) {
            return Err(StoreError::NotFound { id });
        }
        if starred {
            ids.insert(id);
        } else {
            ids.remove(&id);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let featured = match &self.highlight {
            Highlight::Featured(featured) => *featured,
            Highlight::Starred(_) => None,
        };

        StoreSnapshot {
            version: SNAPSHOT_VERSION,
            mode: self.featured_mode(),
            next_id: self.next_id,
            featured,
            posts: self
                .posts
                .iter()
                .map(|(id, post)| SnapshotPost {
                    id: *id,
                    title: post.title.clone(),
                    content: post.content.clone(),
                    author: post.author.clone(),
                    timestamp: post.timestamp,
                    starred: self.highlight.starred_flag(*id).unwrap_or(false),
                })
                .collect(),
        }
    }

    /// Rebuild a store from `snapshot`, rejecting anything that would break the
    /// store's invariants.
    pub fn restore(mode: FeaturedMode, snapshot: StoreSnapshot) -> Result<Self, StoreError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::invalid_snapshot(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        if snapshot.mode != mode {
            return Err(StoreError::invalid_snapshot(format!(
                "snapshot was taken in {} mode but the store runs in {mode} mode",
                snapshot.mode
            )));
        }
        if snapshot.next_id < FIRST_POST_ID {
            return Err(StoreError::invalid_snapshot(format!(
                "next_id must be at least {FIRST_POST_ID}"
            )));
        }

        let mut posts = BTreeMap::new();
        let mut starred = BTreeSet::new();
        for post in snapshot.posts {
            let id = post.id;
            if id.get() < FIRST_POST_ID {
                return Err(StoreError::invalid_snapshot(format!(
                    "post id {id} is reserved"
                )));
            }
            if id.get() >= snapshot.next_id {
                return Err(StoreError::invalid_snapshot(format!(
                    "post id {id} is not below next_id {}",
                    snapshot.next_id
                )));
            }
            if post.starred {
                if mode == FeaturedMode::Single {
                    return Err(StoreError::invalid_snapshot(format!(
                        "post {id} is starred but the snapshot is in single mode"
                    )));
                }
                starred.insert(id);
            }

            let stored = StoredPost {
                title: post.title,
                content: post.content,
                author: post.author,
                timestamp: post.timestamp,
            };
            if posts.insert(id, stored).is_some() {
                return Err(StoreError::invalid_snapshot(format!(
                    "duplicate post id {id}"
                )));
            }
        }

        let highlight = match mode {
            FeaturedMode::Single => {
                if let Some(id) = snapshot.featured.filter(|id| !posts.contains_key(id)) {
                    return Err(StoreError::invalid_snapshot(format!(
                        "featured post {id} does not exist"
                    )));
                }
                Highlight::Featured(snapshot.featured)
            }
            FeaturedMode::Starred => {
                if snapshot.featured.is_some() {
                    return Err(StoreError::invalid_snapshot(
                        "a featured id is only valid in single mode",
                    ));
                }
                Highlight::Starred(starred)
            }
        };

        Ok(Self {
            posts,
            next_id: snapshot.next_id,
            highlight,
        })
    }

    fn record(&self, id: PostId, post: &StoredPost) -> PostRecord {
        PostRecord {
            id,
            title: post.title.clone(),
            content: post.content.clone(),
            author: post.author.clone(),
            timestamp: post.timestamp,
            starred: self.highlight.starred_flag(id),
        }
    }
}
