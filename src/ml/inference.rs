//! Single predictions, attribute comparisons and country sweeps over a
//! loaded predictor. These are synchronous and hold no state.

use crate::error::{AppError, Result};
use crate::ml::classifier::Predictor;
use crate::models::{
    AttributeComparison, AttributeLevel, Country, CountrySaved, CountrySweepResult,
    PredictionRequest, ProbabilityVector,
};

/// Class probabilities for one request.
///
/// Fails with `Capability` when the predictor has no probability output.
pub fn predict_probabilities(
    predictor: &dyn Predictor,
    request: &PredictionRequest,
) -> Result<ProbabilityVector> {
    if !predictor.supports_proba() {
        return Err(AppError::Capability(format!(
            "model '{}' ({}) has no probability output",
            predictor.metadata().name,
            predictor.metadata().model_type
        )));
    }

    let raw = predictor.predict_proba(&request.to_feature_row())?;
    ProbabilityVector::from_classes(&raw)
}

/// Saved probability of `request` against the same scenario with `other`
/// as the attribute level
pub fn compare_attribute_levels(
    predictor: &dyn Predictor,
    request: &PredictionRequest,
    other: AttributeLevel,
) -> Result<AttributeComparison> {
    let first = predict_probabilities(predictor, request)?;
    let second = predict_probabilities(predictor, &request.with_attribute_level(other))?;

    Ok(AttributeComparison {
        attribute_level: request.attribute_level,
        saved_percent: first.saved_percent(),
        attribute_level_compare: other,
        compare_saved_percent: second.saved_percent(),
    })
}

/// Saved probability of `base` for every country, in fixed list order
pub fn sweep_countries(
    predictor: &dyn Predictor,
    base: &PredictionRequest,
) -> Result<CountrySweepResult> {
    let entries = Country::all()
        .into_iter()
        .map(|country| {
            let probabilities = predict_probabilities(predictor, &base.with_country(country))?;
            Ok(CountrySaved {
                country,
                saved_percent: probabilities.saved_percent(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CountrySweepResult { entries })
}
