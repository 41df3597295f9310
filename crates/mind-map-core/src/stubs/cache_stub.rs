//! In-memory and JSON-file layout caches.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::traits::{LayoutCache, StoredLayout};
use crate::types::NodeId;

/// In-memory layout cache.
///
/// Uses a HashMap keyed by fingerprint with an RwLock for concurrent access.
/// Data is lost when the process exits; intended for tests and hosts that
/// supply their own persistence.
#[derive(Debug, Default)]
pub struct InMemoryLayoutCache {
    entries: Arc<RwLock<HashMap<String, StoredLayout>>>,
}

impl InMemoryLayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached layouts (test helper).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl LayoutCache for InMemoryLayoutCache {
    async fn get(&self, fingerprint: &str) -> CoreResult<Option<StoredLayout>> {
        Ok(self.entries.read().await.get(fingerprint).cloned())
    }

    async fn set(&self, fingerprint: &str, layout: StoredLayout) -> CoreResult<()> {
        self.entries
            .write()
            .await
            .insert(fingerprint.to_string(), layout);
        Ok(())
    }

    async fn invalidate(&self, node_ids: &[NodeId]) -> CoreResult<()> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, layout| !layout.nodes.iter().any(|n| node_ids.contains(&n.id)));
        let dropped = before - entries.len();
        if dropped > 0 {
            debug!(dropped, "invalidated cached layouts");
        }
        Ok(())
    }
}

/// JSON-file layout cache: one `<fingerprint>.json` file per entry.
///
/// Fingerprints are lowercase hex, so they are safe as file names. A file
/// that fails to read or parse is logged and reported as a miss rather than
/// an error the pipeline would have to handle.
#[derive(Debug, Clone)]
pub struct FileLayoutCache {
    dir: PathBuf,
}

impl FileLayoutCache {
    /// Create a cache rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, fingerprint: &str) -> CoreResult<PathBuf> {
        // Reject anything that could escape the cache directory.
        if fingerprint.is_empty() || !fingerprint.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::CacheError(format!(
                "invalid fingerprint for file cache: {:?}",
                fingerprint
            )));
        }
        Ok(self.dir.join(format!("{fingerprint}.json")))
    }
}

#[async_trait]
impl LayoutCache for FileLayoutCache {
    async fn get(&self, fingerprint: &str) -> CoreResult<Option<StoredLayout>> {
        let path = self.path_for(fingerprint)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache read failed; treating as miss");
                return Ok(None);
            }
        };
        match serde_json::from_str::<StoredLayout>(&content) {
            Ok(layout) => Ok(Some(layout)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache entry corrupt; treating as miss");
                Ok(None)
            }
        }
    }

    async fn set(&self, fingerprint: &str, layout: StoredLayout) -> CoreResult<()> {
        let path = self.path_for(fingerprint)?;
        let json = serde_json::to_string_pretty(&layout)?;
        tokio::fs::write(&path, json).await?;
        debug!(path = %path.display(), "cached layout written");
        Ok(())
    }

    async fn invalidate(&self, node_ids: &[NodeId]) -> CoreResult<()> {
        let mut dir = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(content) = tokio::fs::read_to_string(&path).await else {
                continue;
            };
            let Ok(layout) = serde_json::from_str::<StoredLayout>(&content) else {
                // Corrupt entries are dead weight either way.
                tokio::fs::remove_file(&path).await.ok();
                continue;
            };
            if layout.nodes.iter().any(|n| node_ids.contains(&n.id)) {
                tokio::fs::remove_file(&path).await?;
                debug!(path = %path.display(), "invalidated cached layout");
            }
        }
        Ok(())
    }
}
