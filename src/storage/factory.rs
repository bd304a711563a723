use crate::config::{Config, ModelSourceKind};
use crate::error::{AppError, Result};
use crate::storage::{FileModelSource, ModelSource, S3ModelSource};
use std::sync::Arc;

/// Create the model source selected by configuration
pub fn create_source(config: &Config) -> Result<Arc<dyn ModelSource>> {
    match config.model.source {
        ModelSourceKind::S3 => {
            tracing::info!(
                bucket = %config.storage.bucket,
                key = %config.storage.key,
                region = %config.storage.region,
                endpoint = ?config.storage.endpoint,
                "Initializing S3 model source"
            );

            let source = S3ModelSource::from_config(&config.storage)?;
            Ok(Arc::new(source))
        }

        ModelSourceKind::File => {
            let path = config.model.path.as_ref().ok_or_else(|| {
                AppError::Configuration("File model source requires 'model.path'".to_string())
            })?;

            tracing::info!(path = ?path, "Initializing file model source");

            Ok(Arc::new(FileModelSource::new(path)))
        }
    }
}
