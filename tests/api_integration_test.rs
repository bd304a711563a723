/// Integration tests for the HTTP API
///
/// Requests go through the full router with `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::*;
use moral_machine_predictor::{
    api::{build_router, AppState},
    ml::{InferenceService, ModelHandle, ModelLoader},
    storage::FileModelSource,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(artifact: &str) -> Router {
    let service = InferenceService::new(handle_from(artifact));
    build_router(AppState::new(Arc::new(service)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app_with(FIXTURE_ARTIFACT);

    let (status, body) = get_json(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = get_json(app, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], true);
}

#[tokio::test]
async fn test_not_ready_before_model_load() {
    let loader = ModelLoader::new(Arc::new(FileModelSource::new("does/not/exist.json")));
    let service = InferenceService::new(Arc::new(ModelHandle::new(loader)));
    let app = build_router(AppState::new(Arc::new(service)));

    let (status, body) = get_json(app.clone(), "/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["model_loaded"], false);

    // Lazy load on first use fails with the generic message
    let (status, body) = post_json(app, "/v1/predict", example_form()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "MODEL_LOAD_ERROR");
    assert_eq!(
        body["error"]["message"],
        "Failed to load the model. Please contact support."
    );
}

#[tokio::test]
async fn test_index_serves_form() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app_with(FIXTURE_ARTIFACT), request).await;

    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Moral Machines Prediction"));
    assert!(html.contains("Predict Saved Probability"));
}

#[tokio::test]
async fn test_options_lists_domains() {
    let (status, body) = get_json(app_with(FIXTURE_ARTIFACT), "/v1/options").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attribute_levels"].as_array().unwrap().len(), 9);
    assert_eq!(body["countries"][0], "USA");
    assert_eq!(body["countries"][9], "KOR");
    assert_eq!(body["flags"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_predict_returns_metric_chart_and_sweep() {
    let (status, body) = post_json(app_with(FIXTURE_ARTIFACT), "/v1/predict", example_form()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metric"]["label"], "Probability of Being Saved");
    assert!(body["metric"]["value"].as_str().unwrap().ends_with('%'));

    let trace = &body["chart"]["data"][0];
    assert_eq!(trace["type"], "bar");
    assert_eq!(trace["x"], json!(["Not Saved", "Saved"]));
    assert_eq!(trace["textposition"], "auto");
    let y: Vec<f64> = trace["y"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert!((y[0] + y[1] - 100.0).abs() < 1e-9);
    assert_eq!(
        body["chart"]["layout"]["title"]["text"],
        "Saved Probability Comparison"
    );
    assert_eq!(
        body["chart"]["layout"]["yaxis"]["title"]["text"],
        "Probability (%)"
    );

    let sweep = &body["sweep"]["chart"];
    assert_eq!(sweep["layout"]["title"]["text"], "Saved Probability by Country");
    assert_eq!(sweep["data"][0]["x"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_compare_returns_advisory() {
    let mut form = example_form();
    form["attribute_level_compare"] = json!("Pets");

    let (status, body) = post_json(app_with(&logistic_artifact()), "/v1/compare", form).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"][0]["label"], "Saved Probability (Hoomans)");
    assert_eq!(body["metrics"][1]["label"], "Saved Probability (Pets)");
    assert_eq!(body["chart"]["data"][0]["x"], json!(["Hoomans", "Pets"]));
    assert_eq!(
        body["chart"]["layout"]["yaxis"]["title"]["text"],
        "Survival Probability (%)"
    );
    assert_eq!(body["prioritized"], "Pets");
    assert_eq!(
        body["advisory"],
        "The AI system prioritizes `Pets` over `Hoomans`, highlighting a potential bias in favor of `Pets`."
    );
}

#[tokio::test]
async fn test_sweep_without_country() {
    let mut form = example_form();
    form.as_object_mut().unwrap().remove("user_country_3");

    let (status, body) = post_json(app_with(&logistic_artifact()), "/v1/sweep", form).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["chart"]["data"][0]["x"],
        json!(["USA", "CAN", "SGP", "CHN", "GBR", "ISR", "FRA", "DEU", "JPN", "KOR"])
    );
}

#[tokio::test]
async fn test_predict_requires_country() {
    let mut form = example_form();
    form.as_object_mut().unwrap().remove("user_country_3");

    let (status, body) = post_json(app_with(FIXTURE_ARTIFACT), "/v1/predict", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_out_of_domain_values_rejected() {
    let app = app_with(FIXTURE_ARTIFACT);

    let mut form = example_form();
    form["crossingsignal"] = json!(3);
    let (status, body) = post_json(app.clone(), "/v1/predict", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let mut form = example_form();
    form["attribute_level"] = json!("Robots");
    let (status, body) = post_json(app.clone(), "/v1/predict", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let mut form = example_form();
    form["attribute_level_compare"] = json!("Pets");
    form["review_religious"] = json!(7);
    let (status, _) = post_json(app, "/v1/compare", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_model_without_probabilities_returns_capability_error() {
    let app = app_with(&svm_artifact());

    let (status, body) = post_json(app.clone(), "/v1/predict", example_form()).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["error"]["code"], "CAPABILITY_ERROR");
    assert_eq!(
        body["error"]["message"],
        "This model does not support probability prediction."
    );
    assert!(body.get("chart").is_none());

    let (status, body) = get_json(app, "/v1/model").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_type"], "linear_svm");
    assert_eq!(body["supports_proba"], false);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let _ = moral_machine_predictor::metrics::init_metrics();
    let app = app_with(FIXTURE_ARTIFACT);

    let _ = post_json(app.clone(), "/v1/predict", example_form()).await;

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("moral_machine_predictor_predictions_total"));
    assert!(text.contains("moral_machine_predictor_http_requests_total"));
}
