use async_trait::async_trait;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::tree::TaskTree;

/// Loads and persists the canonical task tree.
#[async_trait]
pub trait TreeStore {
    async fn load_tree(&self) -> Result<TaskTree, CoreError>;
    async fn save_tree(&self, tree: &TaskTree) -> Result<(), CoreError>;
}

/// Stores the tree as a JSON array of root nodes in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes `payload` to a uniquely named sibling of `path`, then renames it over
/// `path`, so readers never see a partial document.
fn write_atomic(path: &Path, payload: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(payload.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[async_trait]
impl TreeStore for JsonFileStore {
    #[tracing::instrument(skip(self), fields(file = %self.path.display()))]
    async fn load_tree(&self) -> Result<TaskTree, CoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no tree file yet, starting empty");
                return Ok(TaskTree::new());
            }
            Err(err) => return Err(err.into()),
        };

        if raw.trim().is_empty() {
            return Ok(TaskTree::new());
        }
        let tree: TaskTree = serde_json::from_str(&raw)?;
        debug!(nodes = tree.len(), "loaded task tree");
        Ok(tree)
    }

    #[tracing::instrument(skip(self, tree), fields(file = %self.path.display()))]
    async fn save_tree(&self, tree: &TaskTree) -> Result<(), CoreError> {
        let payload = serde_json::to_string_pretty(&tree.without_annotations())?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &payload))
            .await
            .map_err(|err| io::Error::new(ErrorKind::Other, err))??;

        info!(nodes = tree.len(), "saved task tree");
        Ok(())
    }
}
