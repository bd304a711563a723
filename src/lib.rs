//! Moral Machine saved-probability predictor.
//!
//! Loads a trained two-class model from object storage and serves single
//! predictions, attribute-level comparisons and country sweeps over HTTP,
//! rendered as metrics and Plotly bar charts.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod render;
pub mod storage;

pub use error::{AppError, Result};
