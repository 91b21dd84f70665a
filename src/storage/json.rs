use std::path::{Path, PathBuf};

use tokio::fs::File as TokioFile;
use tokio::io::{AsyncWriteExt, BufWriter as TokioBufWriter};
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::Result;
use crate::storage::MemoryGateway;

/// Persists the whole store as one JSON file under the configured data
/// directory, and reloads it on startup.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(storage: &StorageConfig) -> Self {
        Self {
            path: Path::new(&storage.data_dir).join(&storage.snapshot_file),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save(&self, gateway: &MemoryGateway) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let image = gateway.export().await?;
        let bytes = serde_json::to_vec_pretty(&image)?;

        let file = TokioFile::create(&self.path).await?;
        let mut writer = TokioBufWriter::new(file);
        writer.write_all(&bytes).await?;
        writer.flush().await?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Snapshot written");
        Ok(())
    }

    /// Returns `None` when no snapshot exists yet.
    pub async fn load(&self) -> Result<Option<MemoryGateway>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let image = serde_json::from_slice(&bytes)?;
                debug!(path = %self.path.display(), "Snapshot loaded");
                Ok(Some(MemoryGateway::from_snapshot(image)?))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
