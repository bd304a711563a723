//! Shared fixtures for integration tests

#![allow(dead_code)]

use moral_machine_predictor::ml::{ModelArtifact, ModelHandle, Predictor};
use moral_machine_predictor::models::{AttributeLevel, Country, PredictionRequest};
use serde_json::{json, Value};
use std::sync::Arc;

/// Artifact shipped in `fixtures/`, embedded so tests do not depend on the
/// working directory
pub const FIXTURE_ARTIFACT: &str = include_str!("../../fixtures/moral_machine_model.json");

/// Feature schema matching the form fields
pub fn feature_schema() -> Value {
    json!({
        "numeric": ["pedped", "barrier", "crossingsignal", "review_political", "review_religious"],
        "categorical": {
            "attribute_level": ["Hoomans", "Pets", "Female", "Male", "High", "Low", "Young", "Old", "Rand"],
            "user_country_3": ["USA", "CAN", "SGP", "CHN", "GBR", "ISR", "FRA", "DEU", "JPN", "KOR"]
        }
    })
}

/// Width of the encoded vector for `feature_schema`
pub const FEATURE_WIDTH: usize = 5 + 9 + 10;

/// Artifact JSON with the given estimator block
pub fn artifact_json(name: &str, estimator: Value) -> String {
    json!({
        "format_version": 1,
        "name": name,
        "classes": ["not_saved", "saved"],
        "features": feature_schema(),
        "estimator": estimator
    })
    .to_string()
}

/// Fitted linear model in the serde form of `linfa_logistic::FittedLogisticRegression`
pub fn fitted_model(coefficients: &[f64], intercept: f64) -> Value {
    json!({
        "threshold": 0.5,
        "intercept": intercept,
        "params": {"v": 1, "dim": [coefficients.len()], "data": coefficients},
        "labels": {
            "pos": {"class": 1, "label": 1.0},
            "neg": {"class": 0, "label": -1.0}
        }
    })
}

/// Linear estimator with coefficients rising from -0.6 in steps of 0.05.
///
/// Later categories score higher, so `Pets` beats `Hoomans` and `KOR` beats `USA`.
pub fn linear_estimator(kind: &str) -> Value {
    let coefficients: Vec<f64> = (0..FEATURE_WIDTH)
        .map(|i| (i as f64 - 12.0) * 0.05)
        .collect();
    json!({"type": kind, "model": fitted_model(&coefficients, 0.1)})
}

pub fn logistic_artifact() -> String {
    artifact_json("logreg", linear_estimator("logistic_regression"))
}

pub fn svm_artifact() -> String {
    artifact_json("svm", linear_estimator("linear_svm"))
}

/// Depth-one tree splitting on `barrier`
pub fn tree_artifact() -> String {
    artifact_json(
        "tree",
        json!({
            "type": "decision_tree",
            "nodes": [
                {"kind": "split", "feature": 1, "threshold": 0.5, "left": 1, "right": 2},
                {"kind": "leaf", "class_counts": [30.0, 70.0]},
                {"kind": "leaf", "class_counts": [80.0, 20.0]}
            ]
        }),
    )
}

pub fn predictor_from(json: &str) -> Arc<dyn Predictor> {
    ModelArtifact::from_slice(json.as_bytes())
        .expect("artifact parses")
        .into_predictor()
        .expect("artifact builds")
}

pub fn handle_from(json: &str) -> Arc<ModelHandle> {
    Arc::new(ModelHandle::from_predictor(predictor_from(json)))
}

/// The all-zero Hoomans/USA scenario
pub fn example_request() -> PredictionRequest {
    PredictionRequest {
        pedped: 0,
        barrier: 0,
        crossingsignal: 0,
        attribute_level: AttributeLevel::Hoomans,
        user_country_3: Country::USA,
        review_political: 0,
        review_religious: 0,
    }
}

/// Wire form of `example_request`
pub fn example_form() -> Value {
    json!({
        "pedped": 0,
        "barrier": 0,
        "crossingsignal": 0,
        "attribute_level": "Hoomans",
        "user_country_3": "USA",
        "review_political": 0,
        "review_religious": 0
    })
}
