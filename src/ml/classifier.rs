use crate::error::{AppError, Result};
use crate::ml::features::{FeatureRow, OneHotEncoder};
use crate::ml::models::{ModelMetadata, ModelType};
use linfa::traits::Predict;
use linfa_logistic::FittedLogisticRegression;
use ndarray::{Array1, ArrayView1, Axis};

/// Loaded model as seen by the rest of the application.
///
/// Implementations are immutable after construction, so one instance can be
/// shared across concurrent requests.
pub trait Predictor: Send + Sync {
    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Predict the class index for one row
    fn predict(&self, row: &FeatureRow) -> Result<usize>;

    /// Whether `predict_proba` is available
    fn supports_proba(&self) -> bool;

    /// Predict class probabilities for one row
    fn predict_proba(&self, row: &FeatureRow) -> Result<Vec<f64>>;
}

/// Estimator operating on an already encoded feature vector
pub trait Estimator: Send + Sync {
    /// Get model type
    fn model_type(&self) -> ModelType;

    /// Predict the class index
    fn predict(&self, x: ArrayView1<f64>) -> Result<usize>;

    /// Whether the estimator produces class probabilities
    fn supports_proba(&self) -> bool {
        false
    }

    /// Predict class probabilities
    fn predict_proba(&self, _x: ArrayView1<f64>) -> Result<Array1<f64>> {
        Err(AppError::Capability(format!(
            "{} estimator has no probability output",
            self.model_type()
        )))
    }
}

/// Fitted binary logistic regression as stored in the artifact
pub type FittedLogistic = FittedLogisticRegression<f64, usize>;

/// Index of the positive class in a fitted model's labels.
///
/// Class indices follow the artifact's `classes` order, so the labels must be
/// exactly `{0, 1}`.
fn positive_class(model: &FittedLogistic) -> Result<usize> {
    let labels = model.labels();
    match (labels.pos.class, labels.neg.class) {
        (1, 0) => Ok(1),
        (0, 1) => Ok(0),
        (pos, neg) => Err(AppError::ModelLoad(format!(
            "fitted model labels must be classes 0 and 1, found {} and {}",
            pos, neg
        ))),
    }
}

fn single_label(model: &FittedLogistic, x: ArrayView1<f64>) -> Result<usize> {
    check_width(model.params().len(), x.len())?;
    model
        .predict(&x.insert_axis(Axis(0)))
        .iter()
        .next()
        .copied()
        .ok_or_else(|| AppError::Inference("estimator returned no label".to_string()))
}

/// Binary logistic regression backed by `linfa-logistic`
pub struct LogisticRegression {
    model: FittedLogistic,
    positive: usize,
}

impl LogisticRegression {
    pub fn new(model: FittedLogistic) -> Result<Self> {
        let positive = positive_class(&model)?;
        Ok(Self { model, positive })
    }
}

impl Estimator for LogisticRegression {
    fn model_type(&self) -> ModelType {
        ModelType::LogisticRegression
    }

    fn predict(&self, x: ArrayView1<f64>) -> Result<usize> {
        single_label(&self.model, x)
    }

    fn supports_proba(&self) -> bool {
        true
    }

    fn predict_proba(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        check_width(self.model.params().len(), x.len())?;
        let p = self
            .model
            .predict_probabilities(&x.insert_axis(Axis(0)))
            .iter()
            .next()
            .copied()
            .ok_or_else(|| {
                AppError::Inference("estimator returned no probability".to_string())
            })?;

        let mut proba = Array1::zeros(2);
        proba[self.positive] = p;
        proba[1 - self.positive] = 1.0 - p;
        Ok(proba)
    }
}

/// Linear support vector machine; decision function only.
///
/// The separating hyperplane is held in linfa's fitted linear model and only
/// its hard labels are used.
pub struct LinearSvm {
    model: FittedLogistic,
}

impl LinearSvm {
    pub fn new(model: FittedLogistic) -> Result<Self> {
        positive_class(&model)?;
        Ok(Self { model })
    }
}

impl Estimator for LinearSvm {
    fn model_type(&self) -> ModelType {
        ModelType::LinearSvm
    }

    fn predict(&self, x: ArrayView1<f64>) -> Result<usize> {
        single_label(&self.model, x)
    }
}

/// Node of a flattened decision tree
#[derive(Debug, Clone)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class_counts: Array1<f64>,
    },
}

/// Decision tree classifier; probabilities are leaf class frequencies.
///
/// Nodes are validated at load time: children point to higher indices and
/// split features lie inside the encoded width.
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    fn leaf(&self, x: ArrayView1<f64>) -> Result<&Array1<f64>> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x.get(*feature).ok_or_else(|| {
                        AppError::Inference(format!(
                            "split feature {} outside input of width {}",
                            feature,
                            x.len()
                        ))
                    })?;
                    index = if *value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { class_counts }) => return Ok(class_counts),
                None => {
                    return Err(AppError::Inference(format!(
                        "tree walk reached missing node {}",
                        index
                    )))
                }
            }
        }
    }
}

impl Estimator for DecisionTree {
    fn model_type(&self) -> ModelType {
        ModelType::DecisionTree
    }

    fn predict(&self, x: ArrayView1<f64>) -> Result<usize> {
        let counts = self.leaf(x)?;
        Ok(usize::from(counts[1] > counts[0]))
    }

    fn supports_proba(&self) -> bool {
        true
    }

    fn predict_proba(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        let counts = self.leaf(x)?;
        Ok(counts / counts.sum())
    }
}

fn check_width(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(AppError::Inference(format!(
            "feature vector has {} values, estimator expects {}",
            actual, expected
        )));
    }
    Ok(())
}

/// Encoder followed by an estimator
pub struct ModelPipeline {
    metadata: ModelMetadata,
    encoder: OneHotEncoder,
    estimator: Box<dyn Estimator>,
}

impl ModelPipeline {
    pub fn new(
        metadata: ModelMetadata,
        encoder: OneHotEncoder,
        estimator: Box<dyn Estimator>,
    ) -> Self {
        Self {
            metadata,
            encoder,
            estimator,
        }
    }
}

impl Predictor for ModelPipeline {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn predict(&self, row: &FeatureRow) -> Result<usize> {
        let x = self.encoder.transform(row)?;
        self.estimator.predict(x.view())
    }

    fn supports_proba(&self) -> bool {
        self.estimator.supports_proba()
    }

    fn predict_proba(&self, row: &FeatureRow) -> Result<Vec<f64>> {
        let x = self.encoder.transform(row)?;
        Ok(self.estimator.predict_proba(x.view())?.to_vec())
    }
}

#[cfg(test)]
pub(crate) fn fitted_json(coefficients: &[f64], intercept: f64) -> serde_json::Value {
    serde_json::json!({
        "threshold": 0.5,
        "intercept": intercept,
        "params": {"v": 1, "dim": [coefficients.len()], "data": coefficients},
        "labels": {
            "pos": {"class": 1, "label": 1.0},
            "neg": {"class": 0, "label": -1.0}
        }
    })
}
