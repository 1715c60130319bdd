//! TOML file storage for store snapshots.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::application::snapshot::{SnapshotError, SnapshotRepo, StoreSnapshot};

/// Keeps one snapshot at `path`. Writes go to a temporary file in the same
/// directory and are renamed into place, so a crash never leaves a torn file.
#[derive(Debug, Clone)]
pub struct TomlSnapshotRepo {
    path: PathBuf,
}

impl TomlSnapshotRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotRepo for TomlSnapshotRepo {
    async fn load(&self) -> Result<Option<StoreSnapshot>, SnapshotError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        decode(&data).map(Some)
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), SnapshotError> {
        let encoded = encode(snapshot)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, encoded.as_bytes()))
            .await
            .map_err(|err| SnapshotError::Io(io::Error::other(err)))?
    }
}

pub fn encode(snapshot: &StoreSnapshot) -> Result<String, SnapshotError> {
    toml::to_string_pretty(snapshot).map_err(|err| SnapshotError::Encode(err.to_string()))
}

pub fn decode(data: &str) -> Result<StoreSnapshot, SnapshotError> {
    toml::from_str(data).map_err(|err| SnapshotError::Decode(err.to_string()))
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), SnapshotError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| SnapshotError::Io(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::snapshot::{SNAPSHOT_VERSION, SnapshotPost};
    use crate::domain::{entities::PostId, types::FeaturedMode};

    fn sample_snapshot() -> StoreSnapshot {
        StoreSnapshot {
            version: SNAPSHOT_VERSION,
            mode: FeaturedMode::Single,
            next_id: 4,
            featured: Some(PostId::new(3)),
            posts: vec![
                SnapshotPost {
                    id: PostId::new(1),
                    title: "Hello".into(),
                    content: "First \"quoted\" body\nwith a newline".into(),
                    author: "ada".into(),
                    timestamp: 1_700_000_000_000_000_000,
                    starred: false,
                },
                SnapshotPost {
                    id: PostId::new(3),
                    title: "".into(),
                    content: "".into(),
                    author: "".into(),
                    timestamp: 1_700_000_000_000_000_500,
                    starred: false,
                },
            ],
        }
    }

    #[tokio::test]
    async fn save_then_load_returns_same_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = TomlSnapshotRepo::new(dir.path().join("nested").join("store.toml"));

        repo.save(&sample_snapshot()).await.expect("save");
        let loaded = repo.load().await.expect("load");

        assert_eq!(loaded, Some(sample_snapshot()));
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = TomlSnapshotRepo::new(dir.path().join("absent.toml"));
        assert_eq!(repo.load().await.expect("load"), None);
    }

    #[tokio::test]
    async fn malformed_file_is_a_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.toml");
        fs::write(&path, "version = \"one\"").expect("write");

        let result = TomlSnapshotRepo::new(&path).load().await;
        assert!(matches!(result, Err(SnapshotError::Decode(_))));
    }

    #[tokio::test]
    async fn save_replaces_previous_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = TomlSnapshotRepo::new(dir.path().join("store.toml"));

        repo.save(&sample_snapshot()).await.expect("first save");
        let mut next = sample_snapshot();
        next.featured = None;
        next.next_id = 9;
        repo.save(&next).await.expect("second save");

        assert_eq!(repo.load().await.expect("load"), Some(next));
    }

    #[test]
    fn encoded_snapshot_is_readable_toml() {
        let encoded = encode(&sample_snapshot()).expect("encode");
        assert!(encoded.contains("mode = \"single\""));
        assert!(encoded.contains("next_id = 4"));
        assert!(encoded.contains("[[posts]]"));
    }
}
