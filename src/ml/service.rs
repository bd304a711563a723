use crate::error::Result;
use crate::metrics::{INFERENCE_DURATION_SECONDS, PREDICTIONS_TOTAL};
use crate::ml::inference;
use crate::ml::loader::ModelHandle;
use crate::ml::models::ModelMetadata;
use crate::models::{
    AttributeComparison, AttributeLevel, CountrySweepResult, PredictionRequest, ProbabilityVector,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Prediction actions exposed to the HTTP layer
pub struct InferenceService {
    handle: Arc<ModelHandle>,
}

impl InferenceService {
    pub fn new(handle: Arc<ModelHandle>) -> Self {
        Self { handle }
    }

    /// Whether the predictor has been loaded
    pub fn is_ready(&self) -> bool {
        self.handle.is_loaded()
    }

    /// Probabilities for a single scenario
    pub async fn predict(&self, request: &PredictionRequest) -> Result<ProbabilityVector> {
        let predictor = self.handle.get().await?;
        observe("predict", || {
            inference::predict_probabilities(predictor.as_ref(), request)
        })
    }

    /// Saved probability under two attribute levels
    pub async fn compare(
        &self,
        request: &PredictionRequest,
        other: AttributeLevel,
    ) -> Result<AttributeComparison> {
        let predictor = self.handle.get().await?;
        observe("compare", || {
            inference::compare_attribute_levels(predictor.as_ref(), request, other)
        })
    }

    /// Saved probability for every country
    pub async fn sweep(&self, base: &PredictionRequest) -> Result<CountrySweepResult> {
        let predictor = self.handle.get().await?;
        observe("sweep", || inference::sweep_countries(predictor.as_ref(), base))
    }

    /// Metadata of the loaded predictor
    pub async fn model_metadata(&self) -> Result<ModelMetadata> {
        let predictor = self.handle.get().await?;
        Ok(predictor.metadata().clone())
    }
}

/// Run one action, recording its duration and outcome
fn observe<T>(action: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    let result = f();
    INFERENCE_DURATION_SECONDS
        .with_label_values(&[action])
        .observe(start.elapsed().as_secs_f64());

    match &result {
        Ok(_) => {
            PREDICTIONS_TOTAL.with_label_values(&[action, "success"]).inc();
            debug!(action, "Prediction completed");
        }
        Err(e) => {
            let outcome = e.error_code().to_lowercase();
            PREDICTIONS_TOTAL
                .with_label_values(&[action, outcome.as_str()])
                .inc();
            warn!(action, error = %e, "Prediction failed");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::ml::artifact::ModelArtifact;
    use crate::ml::classifier::fitted_json;
    use crate::models::Country;

    fn linear(kind: &str) -> String {
        serde_json::json!({"type": kind, "model": fitted_json(&[0.2, 0.4, -0.4], 0.1)})
            .to_string()
    }

    fn service(estimator: &str) -> InferenceService {
        let json = format!(
            r#"{{
                "format_version": 1,
                "name": "svc",
                "classes": ["not_saved", "saved"],
                "features": {{
                    "numeric": ["barrier"],
                    "categorical": {{"attribute_level": ["Hoomans", "Pets"]}}
                }},
                "estimator": {}
            }}"#,
            estimator
        );
        let predictor = ModelArtifact::from_slice(json.as_bytes())
            .unwrap()
            .into_predictor()
            .unwrap();
        InferenceService::new(Arc::new(ModelHandle::from_predictor(predictor)))
    }

    fn request() -> PredictionRequest {
        PredictionRequest {
            pedped: 0,
            barrier: 1,
            crossingsignal: 0,
            attribute_level: AttributeLevel::Pets,
            user_country_3: Country::CAN,
            review_political: 0,
            review_religious: 0,
        }
    }

    #[tokio::test]
    async fn test_actions_and_metrics() {
        let svc = service(&linear("logistic_regression"));
        assert!(svc.is_ready());

        let before = PREDICTIONS_TOTAL
            .with_label_values(&["predict", "success"])
            .get();
        let p = svc.predict(&request()).await.unwrap();
        assert!((p.saved() + p.not_saved() - 1.0).abs() < 1e-9);
        assert!(
            PREDICTIONS_TOTAL
                .with_label_values(&["predict", "success"])
                .get()
                > before
        );

        let comparison = svc.compare(&request(), AttributeLevel::Hoomans).await.unwrap();
        assert_eq!(comparison.prioritized(), AttributeLevel::Hoomans);

        assert_eq!(svc.sweep(&request()).await.unwrap().len(), 10);
        assert_eq!(svc.model_metadata().await.unwrap().name, "svc");
    }

    #[tokio::test]
    async fn test_capability_error_is_counted() {
        let svc = service(&linear("linear_svm"));
        let before = PREDICTIONS_TOTAL
            .with_label_values(&["compare", "capability_error"])
            .get();

        let result = svc.compare(&request(), AttributeLevel::Hoomans).await;
        assert!(matches!(result, Err(AppError::Capability(_))));
        assert!(
            PREDICTIONS_TOTAL
                .with_label_values(&["compare", "capability_error"])
                .get()
                > before
        );
    }
}
