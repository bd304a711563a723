//! Metric and bar-chart views built from prediction results.
//!
//! Charts serialize as Plotly figure JSON so the page can hand them
//! straight to `Plotly.newPlot`.

use crate::models::{AttributeComparison, AttributeLevel, CountrySweepResult, ProbabilityVector};
use serde::Serialize;

pub const SAVED_METRIC_LABEL: &str = "Probability of Being Saved";
pub const PREDICTION_CHART_TITLE: &str = "Saved Probability Comparison";
pub const COMPARISON_CHART_TITLE: &str = "Attribute Level Comparison";
pub const SWEEP_CHART_TITLE: &str = "Saved Probability by Country";
pub const PROBABILITY_AXIS: &str = "Probability (%)";
pub const SURVIVAL_AXIS: &str = "Survival Probability (%)";

/// Percentage with two decimals, e.g. `42.00%`
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Labelled headline number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricView {
    pub label: String,
    pub value: String,
}

impl MetricView {
    pub fn percent(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: format_percent(value),
        }
    }
}

/// Single-series bar chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Figure")]
pub struct BarChart {
    pub title: String,
    pub y_axis_title: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

impl BarChart {
    pub fn new(
        title: impl Into<String>,
        y_axis_title: impl Into<String>,
        categories: Vec<String>,
        values: Vec<f64>,
    ) -> Self {
        Self {
            title: title.into(),
            y_axis_title: y_axis_title.into(),
            categories,
            values,
        }
    }

    /// Data labels, one per bar
    pub fn labels(&self) -> Vec<String> {
        self.values.iter().copied().map(format_percent).collect()
    }
}

#[derive(Debug, Serialize)]
struct Figure {
    data: Vec<BarTrace>,
    layout: Layout,
}

#[derive(Debug, Serialize)]
struct BarTrace {
    #[serde(rename = "type")]
    kind: &'static str,
    x: Vec<String>,
    y: Vec<f64>,
    text: Vec<String>,
    textposition: &'static str,
}

#[derive(Debug, Serialize)]
struct Layout {
    title: Title,
    yaxis: Axis,
}

#[derive(Debug, Serialize)]
struct Axis {
    title: Title,
}

#[derive(Debug, Serialize)]
struct Title {
    text: String,
}

impl From<BarChart> for Figure {
    fn from(chart: BarChart) -> Self {
        let text = chart.labels();
        Figure {
            data: vec![BarTrace {
                kind: "bar",
                x: chart.categories,
                y: chart.values,
                text,
                textposition: "auto",
            }],
            layout: Layout {
                title: Title { text: chart.title },
                yaxis: Axis {
                    title: Title {
                        text: chart.y_axis_title,
                    },
                },
            },
        }
    }
}

/// Single prediction: headline metric, class chart and the country sweep
#[derive(Debug, Clone, Serialize)]
pub struct PredictionView {
    pub metric: MetricView,
    pub chart: BarChart,
    pub sweep: SweepView,
}

/// Two-level comparison
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonView {
    pub metrics: Vec<MetricView>,
    pub chart: BarChart,
    pub advisory: String,
    pub prioritized: AttributeLevel,
}

/// Per-country saved probability
#[derive(Debug, Clone, Serialize)]
pub struct SweepView {
    pub chart: BarChart,
}

pub fn render_prediction(
    probabilities: &ProbabilityVector,
    sweep: &CountrySweepResult,
) -> PredictionView {
    PredictionView {
        metric: MetricView::percent(SAVED_METRIC_LABEL, probabilities.saved_percent()),
        chart: BarChart::new(
            PREDICTION_CHART_TITLE,
            PROBABILITY_AXIS,
            vec!["Not Saved".to_string(), "Saved".to_string()],
            vec![probabilities.not_saved_percent(), probabilities.saved_percent()],
        ),
        sweep: render_sweep(sweep),
    }
}

pub fn render_comparison(comparison: &AttributeComparison) -> ComparisonView {
    let first = comparison.attribute_level.to_string();
    let second = comparison.attribute_level_compare.to_string();

    ComparisonView {
        metrics: vec![
            MetricView::percent(format!("Saved Probability ({})", first), comparison.saved_percent),
            MetricView::percent(
                format!("Saved Probability ({})", second),
                comparison.compare_saved_percent,
            ),
        ],
        chart: BarChart::new(
            COMPARISON_CHART_TITLE,
            SURVIVAL_AXIS,
            vec![first, second],
            vec![comparison.saved_percent, comparison.compare_saved_percent],
        ),
        advisory: comparison.advisory(),
        prioritized: comparison.prioritized(),
    }
}

pub fn render_sweep(sweep: &CountrySweepResult) -> SweepView {
    let (categories, values): (Vec<String>, Vec<f64>) = sweep
        .entries
        .iter()
        .map(|entry| (entry.country.to_string(), entry.saved_percent))
        .unzip();

    SweepView {
        chart: BarChart::new(SWEEP_CHART_TITLE, PROBABILITY_AXIS, categories, values),
    }
}
