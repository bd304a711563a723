use crate::error::{AppError, Result};
use crate::storage::ModelSource;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Model artifact on the local filesystem
pub struct FileModelSource {
    path: PathBuf,
}

impl FileModelSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ModelSource for FileModelSource {
    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }

    async fn download(&self, dest: &Path) -> Result<u64> {
        tokio::fs::copy(&self.path, dest).await.map_err(|e| {
            AppError::ModelLoad(format!("cannot read {}: {}", self.path.display(), e))
        })
    }
}
