//! Model artifact decoding, estimators, loading and inference.

pub mod artifact;
pub mod classifier;
pub mod features;
pub mod inference;
pub mod loader;
pub mod models;
pub mod service;

pub use artifact::{EstimatorSchema, FeatureSchema, ModelArtifact, TreeNodeSchema, FORMAT_VERSION};
pub use classifier::{Estimator, ModelPipeline, Predictor};
pub use features::{FeatureRow, FeatureValue, OneHotEncoder};
pub use inference::{compare_attribute_levels, predict_probabilities, sweep_countries};
pub use loader::{ModelHandle, ModelLoader};
pub use models::{ModelMetadata, ModelType};
pub use service::InferenceService;
