//! Process-wide post service: one [`PostStore`] behind one lock.
//!
//! Every call takes the lock for exactly one store operation and never holds it
//! across an `.await`, so operations are observed one whole call at a time.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use metrics::{counter, gauge};
use tracing::{debug, info, warn};

use crate::application::clock::Clock;
use crate::application::snapshot::StoreSnapshot;
use crate::application::store::{PostStore, StoreError};
use crate::domain::{
    entities::{PostContent, PostId, PostRecord},
    types::FeaturedMode,
};

pub struct PostService {
    store: RwLock<PostStore>,
    clock: Arc<dyn Clock>,
}

impl PostService {
    pub fn new(mode: FeaturedMode, clock: Arc<dyn Clock>) -> Self {
        Self::with_store(PostStore::new(mode), clock)
    }

    pub fn from_snapshot(
        mode: FeaturedMode,
        snapshot: StoreSnapshot,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let store = PostStore::restore(mode, snapshot)?;
        Ok(Self::with_store(store, clock))
    }

    fn with_store(store: PostStore, clock: Arc<dyn Clock>) -> Self {
        gauge!("inkwell_posts_stored").set(store.len() as f64);
        Self {
            store: RwLock::new(store),
            clock,
        }
    }

    pub fn featured_mode(&self) -> FeaturedMode {
        self.read("featured_mode").featured_mode()
    }

    pub fn post_count(&self) -> usize {
        self.read("post_count").len()
    }

    pub fn create_post(&self, content: PostContent) -> Result<PostId, StoreError> {
        let timestamp = self.clock.now_nanos();
        let id = self.mutate("create_post", |store| store.create_post(content, timestamp))?;

        counter!("inkwell_posts_created_total").increment(1);
        info!(
            target = "inkwell::posts",
            post_id = %id,
            timestamp,
            "Post created"
        );
        Ok(id)
    }

    pub fn edit_post(&self, id: PostId, content: PostContent) -> Result<(), StoreError> {
        self.mutate("edit_post", |store| store.edit_post(id, content))?;

        counter!("inkwell_posts_edited_total").increment(1);
        info!(target = "inkwell::posts", post_id = %id, "Post edited");
        Ok(())
    }

    pub fn delete_post(&self, id: PostId) -> Result<(), StoreError> {
        self.mutate("delete_post", |store| store.delete_post(id))?;

        counter!("inkwell_posts_deleted_total").increment(1);
        info!(target = "inkwell::posts", post_id = %id, "Post deleted");
        Ok(())
    }

    pub fn list_posts(&self) -> Vec<PostRecord> {
        self.read("list_posts").posts()
    }

    pub fn get_post(&self, id: PostId) -> Result<PostRecord, StoreError> {
        let result = self.read("get_post").post(id);
        if let Err(err) = &result {
            record_failure("get_post", err);
        }
        result
    }

    pub fn featured_posts(&self) -> Vec<PostRecord> {
        self.read("featured_posts").featured_posts()
    }

    pub fn set_featured_post(&self, id: PostId) -> Result<(), StoreError> {
        self.mutate("set_featured_post", |store| store.set_featured_post(id))?;
        record_status_change("set_featured", Some(id));
        Ok(())
    }

    pub fn clear_featured_post(&self) -> Result<(), StoreError> {
        self.mutate("clear_featured_post", PostStore::clear_featured_post)?;
        record_status_change("clear_featured", None);
        Ok(())
    }

    pub fn star_post(&self, id: PostId) -> Result<(), StoreError> {
        self.mutate("star_post", |store| store.star_post(id))?;
        record_status_change("star", Some(id));
        Ok(())
    }

    pub fn unstar_post(&self, id: PostId) -> Result<(), StoreError> {
        self.mutate("unstar_post", |store| store.unstar_post(id))?;
        record_status_change("unstar", Some(id));
        Ok(())
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.read("snapshot").snapshot()
    }

    fn mutate<T>(
        &self,
        op: &'static str,
        apply: impl FnOnce(&mut PostStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let result = {
            let mut store = self.write(op);
            let result = apply(&mut *store);
            // Published under the lock so concurrent writers report lengths in
            // the order their mutations applied.
            gauge!("inkwell_posts_stored").set(store.len() as f64);
            result
        };

        if let Err(err) = &result {
            record_failure(op, err);
        }
        result
    }

    // Store operations never panic half-way, so a poisoned lock still guards a
    // consistent store.
    fn read(&self, op: &'static str) -> RwLockReadGuard<'_, PostStore> {
        self.store.read().unwrap_or_else(|poisoned| {
            warn!(
                target = "inkwell::posts",
                op,
                lock = "read",
                "Recovered poisoned post store lock"
            );
            poisoned.into_inner()
        })
    }

    fn write(&self, op: &'static str) -> RwLockWriteGuard<'_, PostStore> {
        self.store.write().unwrap_or_else(|poisoned| {
            warn!(
                target = "inkwell::posts",
                op,
                lock = "write",
                "Recovered poisoned post store lock"
            );
            poisoned.into_inner()
        })
    }
}

fn record_status_change(operation: &'static str, id: Option<PostId>) {
    counter!("inkwell_posts_status_changed_total", "operation" => operation).increment(1);
    match id {
        Some(id) => info!(
            target = "inkwell::posts",
            operation,
            post_id = %id,
            "Post status changed"
        ),
        None => info!(target = "inkwell::posts", operation, "Post status changed"),
    }
}

fn record_failure(op: &'static str, err: &StoreError) {
    match err {
        StoreError::NotFound { id } => {
            counter!("inkwell_post_lookup_failures_total", "operation" => op).increment(1);
            debug!(
                target = "inkwell::posts",
                op,
                post_id = %id,
                "Post not found"
            );
        }
        other => warn!(
            target = "inkwell::posts",
            op,
            error = %other,
            "Post store operation rejected"
        ),
    }
}
