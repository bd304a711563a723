use serde::{Deserialize, Serialize};
use strum::Display;

/// Estimator family behind a loaded predictor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelType {
    LogisticRegression,
    DecisionTree,
    LinearSvm,
}

/// Descriptive information about a loaded predictor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name from the artifact
    pub name: String,

    /// Estimator family
    pub model_type: ModelType,

    /// Width of the encoded feature vector
    pub n_features: usize,

    /// Encoded feature names
    pub feature_names: Vec<String>,

    /// Class labels in probability-column order
    pub classes: Vec<String>,

    /// Whether class probabilities are available
    pub supports_proba: bool,
}
