use crate::api::extract::ValidatedJson;
use crate::api::AppState;
use crate::error::Result;
use crate::metrics::gather_metrics;
use crate::ml::ModelMetadata;
use crate::models::{AttributeLevel, CompareForm, Country, ScenarioForm};
use crate::render::{self, ComparisonView, PredictionView, SweepView};
use axum::{extract::State, http::StatusCode, response::Html, Json};
use serde::Serialize;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Prediction form page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy", &state))
}

/// Ready once the model is loaded
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.inference.is_ready() {
        (StatusCode::OK, Json(HealthResponse::new("ready", &state)))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new("loading", &state)),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_loaded: bool,
}

impl HealthResponse {
    fn new(status: &str, state: &AppState) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            model_loaded: state.inference.is_ready(),
        }
    }
}

/// Domains of every form field
pub async fn options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        attribute_levels: AttributeLevel::all(),
        countries: Country::all(),
        flags: vec![
            FlagRange::new("pedped", "Pedestrian", 1),
            FlagRange::new("barrier", "Barrier Present", 1),
            FlagRange::new("crossingsignal", "Crossing Signal", 2),
            FlagRange::new("review_political", "Political Review", 1),
            FlagRange::new("review_religious", "Religious Review", 1),
        ],
    })
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub attribute_levels: Vec<AttributeLevel>,
    pub countries: Vec<Country>,
    pub flags: Vec<FlagRange>,
}

#[derive(Debug, Serialize)]
pub struct FlagRange {
    pub name: &'static str,
    pub label: &'static str,
    pub min: u8,
    pub max: u8,
}

impl FlagRange {
    fn new(name: &'static str, label: &'static str, max: u8) -> Self {
        Self {
            name,
            label,
            min: 0,
            max,
        }
    }
}

/// Saved probability for one scenario, with the country sweep
pub async fn predict(
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<ScenarioForm>,
) -> Result<Json<PredictionView>> {
    let request = form.into_request()?;

    let probabilities = state.inference.predict(&request).await?;
    let sweep = state.inference.sweep(&request).await?;

    Ok(Json(render::render_prediction(&probabilities, &sweep)))
}

/// Saved probability under two attribute levels
pub async fn compare(
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<CompareForm>,
) -> Result<Json<ComparisonView>> {
    let request = form.scenario.into_request()?;
    let comparison = state
        .inference
        .compare(&request, form.attribute_level_compare)
        .await?;

    Ok(Json(render::render_comparison(&comparison)))
}

/// Saved probability for every country
pub async fn sweep(
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<ScenarioForm>,
) -> Result<Json<SweepView>> {
    let base = form.into_sweep_base()?;
    let sweep = state.inference.sweep(&base).await?;

    Ok(Json(render::render_sweep(&sweep)))
}

/// Metadata of the loaded model
pub async fn model_info(State(state): State<AppState>) -> Result<Json<ModelMetadata>> {
    Ok(Json(state.inference.model_metadata().await?))
}

/// Prometheus text exposition
pub async fn metrics() -> (StatusCode, String) {
    (StatusCode::OK, gather_metrics())
}
