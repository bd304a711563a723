use crate::error::{AppError, Result};
use crate::metrics::{MODEL_LOADED, MODEL_LOADS_TOTAL};
use crate::ml::artifact::ModelArtifact;
use crate::ml::classifier::Predictor;
use crate::storage::ModelSource;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// Fetches a model artifact from a source and builds a predictor.
///
/// The artifact is downloaded into a named temporary file that is removed
/// when the load returns, whether it succeeded or not.
pub struct ModelLoader {
    source: Arc<dyn ModelSource>,
    download_dir: Option<PathBuf>,
}

impl ModelLoader {
    pub fn new(source: Arc<dyn ModelSource>) -> Self {
        Self {
            source,
            download_dir: None,
        }
    }

    /// Place temporary downloads under `dir` instead of the system temp dir
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Download, decode and build the predictor
    pub async fn load(&self) -> Result<Arc<dyn Predictor>> {
        let source = self.source.describe();
        info!(source = %source, "Loading model");

        match self.fetch_and_build().await {
            Ok(predictor) => {
                MODEL_LOADS_TOTAL.with_label_values(&["success"]).inc();
                MODEL_LOADED.set(1.0);
                Ok(predictor)
            }
            Err(e) => {
                MODEL_LOADS_TOTAL.with_label_values(&["failure"]).inc();
                error!(source = %source, error = %e, "Model load failed");
                Err(e)
            }
        }
    }

    async fn fetch_and_build(&self) -> Result<Arc<dyn Predictor>> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("model-").suffix(".json");
        let temp = match &self.download_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| AppError::ModelLoad(format!("cannot create download file: {}", e)))?;

        let bytes = self.source.download(temp.path()).await?;
        debug!(path = %temp.path().display(), bytes, "Model artifact downloaded");

        let raw = tokio::fs::read(temp.path()).await.map_err(|e| {
            AppError::ModelLoad(format!("cannot read downloaded artifact: {}", e))
        })?;
        let artifact = ModelArtifact::from_slice(&raw)?;
        let name = artifact.name.clone();
        let predictor = artifact.into_predictor()?;

        info!(
            model = %name,
            model_type = %predictor.metadata().model_type,
            bytes,
            supports_proba = predictor.supports_proba(),
            "Model loaded"
        );
        Ok(predictor)
    }
}

/// Lazily loaded, process-wide predictor.
///
/// The first `get` triggers the load; concurrent first callers wait on the
/// same initialization. A failed load leaves the handle empty.
pub struct ModelHandle {
    loader: Option<ModelLoader>,
    predictor: OnceCell<Arc<dyn Predictor>>,
}

impl ModelHandle {
    pub fn new(loader: ModelLoader) -> Self {
        Self {
            loader: Some(loader),
            predictor: OnceCell::new(),
        }
    }

    /// Handle around an already built predictor
    pub fn from_predictor(predictor: Arc<dyn Predictor>) -> Self {
        MODEL_LOADED.set(1.0);
        Self {
            loader: None,
            predictor: OnceCell::new_with(Some(predictor)),
        }
    }

    /// Cached predictor, loading it on first use
    pub async fn get(&self) -> Result<Arc<dyn Predictor>> {
        self.predictor
            .get_or_try_init(|| async {
                match &self.loader {
                    Some(loader) => loader.load().await,
                    None => Err(AppError::ModelLoad("no model loader configured".to_string())),
                }
            })
            .await
            .map(Arc::clone)
    }

    /// Predictor if a load already completed
    pub fn get_if_loaded(&self) -> Option<Arc<dyn Predictor>> {
        self.predictor.get().map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.predictor.initialized()
    }
}
