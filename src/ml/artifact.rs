//! Serialized model artifact.
//!
//! The artifact is a JSON document carrying the input schema, the class
//! labels and one estimator. Schema types stay separate from the runtime
//! estimators so the stored format can be validated before anything is
//! built from it.

use crate::error::{AppError, Result};
use crate::ml::classifier::{
    DecisionTree, Estimator, FittedLogistic, LinearSvm, LogisticRegression, ModelPipeline,
    Predictor, TreeNode,
};
use crate::ml::features::OneHotEncoder;
use crate::ml::models::ModelMetadata;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

/// Artifact schema version understood by this build
pub const FORMAT_VERSION: u32 = 1;

/// Top-level model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub name: String,
    /// Class labels in probability-column order
    pub classes: Vec<String>,
    pub features: FeatureSchema,
    pub estimator: EstimatorSchema,
}

/// Input columns the model expects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Numeric passthrough columns, in encoding order
    #[serde(default)]
    pub numeric: Vec<String>,
    /// Categorical column -> known categories
    #[serde(default)]
    pub categorical: BTreeMap<String, Vec<String>>,
}

/// Estimator parameters.
///
/// Linear kinds carry a `linfa-logistic` fitted model in its serde form,
/// with class indices following `classes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EstimatorSchema {
    LogisticRegression { model: FittedLogistic },
    DecisionTree { nodes: Vec<TreeNodeSchema> },
    LinearSvm { model: FittedLogistic },
}

/// Flat tree node; children always sit at higher indices than their parent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNodeSchema {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class_counts: Vec<f64>,
    },
}

impl ModelArtifact {
    /// Parse an artifact from raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| AppError::ModelLoad(format!("malformed model artifact: {}", e)))
    }

    /// Parse an artifact from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| AppError::ModelLoad(format!("malformed model artifact: {}", e)))
    }

    /// Check structural consistency against the encoder width
    pub fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(AppError::ModelLoad(format!(
                "unsupported artifact format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            )));
        }

        if self.classes.len() != 2 {
            return Err(AppError::ModelLoad(format!(
                "expected a two-class model, artifact declares {} classes",
                self.classes.len()
            )));
        }

        let width = OneHotEncoder::from_schema(&self.features).n_features();
        if width == 0 {
            return Err(AppError::ModelLoad(
                "artifact declares no input features".to_string(),
            ));
        }

        match &self.estimator {
            EstimatorSchema::LogisticRegression { model }
            | EstimatorSchema::LinearSvm { model } => {
                let params = model.params();
                if params.len() != width {
                    return Err(AppError::ModelLoad(format!(
                        "estimator has {} coefficients but the encoder produces {} features",
                        params.len(),
                        width
                    )));
                }
                if !model.intercept().is_finite() || params.iter().any(|w| !w.is_finite()) {
                    return Err(AppError::ModelLoad(
                        "estimator has non-finite parameters".to_string(),
                    ));
                }
            }
            EstimatorSchema::DecisionTree { nodes } => validate_tree(nodes, width)?,
        }

        Ok(())
    }

    /// Validate and build the runtime predictor
    pub fn into_predictor(self) -> Result<Arc<dyn Predictor>> {
        self.validate()?;

        let encoder = OneHotEncoder::from_schema(&self.features);
        let estimator: Box<dyn Estimator> = match self.estimator {
            EstimatorSchema::LogisticRegression { model } => {
                Box::new(LogisticRegression::new(model)?)
            }
            EstimatorSchema::LinearSvm { model } => Box::new(LinearSvm::new(model)?),
            EstimatorSchema::DecisionTree { nodes } => Box::new(DecisionTree::new(
                nodes.into_iter().map(TreeNode::from).collect(),
            )),
        };

        let metadata = ModelMetadata {
            name: self.name,
            model_type: estimator.model_type(),
            n_features: encoder.n_features(),
            feature_names: encoder.feature_names(),
            classes: self.classes,
            supports_proba: estimator.supports_proba(),
        };

        Ok(Arc::new(ModelPipeline::new(metadata, encoder, estimator)))
    }
}

fn validate_tree(nodes: &[TreeNodeSchema], width: usize) -> Result<()> {
    if nodes.is_empty() {
        return Err(AppError::ModelLoad("decision tree has no nodes".to_string()));
    }

    for (index, node) in nodes.iter().enumerate() {
        match node {
            TreeNodeSchema::Split {
                feature,
                left,
                right,
                threshold,
            } => {
                if *feature >= width {
                    return Err(AppError::ModelLoad(format!(
                        "tree node {} splits on feature {} of {}",
                        index, feature, width
                    )));
                }
                if !threshold.is_finite() {
                    return Err(AppError::ModelLoad(format!(
                        "tree node {} has a non-finite threshold",
                        index
                    )));
                }
                for child in [left, right] {
                    if *child <= index || *child >= nodes.len() {
                        return Err(AppError::ModelLoad(format!(
                            "tree node {} points to invalid child {}",
                            index, child
                        )));
                    }
                }
            }
            TreeNodeSchema::Leaf { class_counts } => {
                let total: f64 = class_counts.iter().sum();
                if class_counts.len() != 2
                    || class_counts.iter().any(|c| !c.is_finite() || *c < 0.0)
                    || total <= 0.0
                {
                    return Err(AppError::ModelLoad(format!(
                        "tree leaf {} must hold two non-negative class counts",
                        index
                    )));
                }
            }
        }
    }

    Ok(())
}

impl From<TreeNodeSchema> for TreeNode {
    fn from(node: TreeNodeSchema) -> Self {
        match node {
            TreeNodeSchema::Split {
                feature,
                threshold,
                left,
                right,
            } => TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            },
            TreeNodeSchema::Leaf { class_counts } => TreeNode::Leaf {
                class_counts: Array1::from(class_counts),
            },
        }
    }
}
