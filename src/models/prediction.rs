use crate::error::{AppError, Result};
use crate::models::scenario::{AttributeLevel, Country};
use serde::Serialize;

/// Class probabilities for one scenario: index 0 "not saved", index 1 "saved"
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityVector {
    not_saved: f64,
    saved: f64,
}

impl ProbabilityVector {
    /// Allowed drift of the class sum away from 1.0
    pub const TOLERANCE: f64 = 1e-6;

    /// Build from raw predictor output, rejecting anything that is not a
    /// two-class distribution.
    pub fn from_classes(probabilities: &[f64]) -> Result<Self> {
        let [not_saved, saved] = probabilities else {
            return Err(AppError::Inference(format!(
                "expected 2 class probabilities, got {}",
                probabilities.len()
            )));
        };

        for p in [not_saved, saved] {
            if !p.is_finite() || *p < 0.0 {
                return Err(AppError::Inference(format!(
                    "invalid class probability {}",
                    p
                )));
            }
        }

        let sum = not_saved + saved;
        if (sum - 1.0).abs() > Self::TOLERANCE {
            return Err(AppError::Inference(format!(
                "class probabilities sum to {} instead of 1",
                sum
            )));
        }

        Ok(Self {
            not_saved: *not_saved,
            saved: *saved,
        })
    }

    pub fn not_saved(&self) -> f64 {
        self.not_saved
    }

    pub fn saved(&self) -> f64 {
        self.saved
    }

    pub fn not_saved_percent(&self) -> f64 {
        self.not_saved * 100.0
    }

    pub fn saved_percent(&self) -> f64 {
        self.saved * 100.0
    }
}

/// Saved probability of one scenario under two attribute levels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeComparison {
    pub attribute_level: AttributeLevel,
    pub saved_percent: f64,
    pub attribute_level_compare: AttributeLevel,
    pub compare_saved_percent: f64,
}

impl AttributeComparison {
    /// Level with the strictly higher saved probability; a tie reports the
    /// compared level.
    pub fn prioritized(&self) -> AttributeLevel {
        if self.saved_percent > self.compare_saved_percent {
            self.attribute_level
        } else {
            self.attribute_level_compare
        }
    }

    /// The other level
    pub fn deprioritized(&self) -> AttributeLevel {
        if self.saved_percent > self.compare_saved_percent {
            self.attribute_level_compare
        } else {
            self.attribute_level
        }
    }

    /// Advisory sentence shown under the comparison chart
    pub fn advisory(&self) -> String {
        if self.saved_percent > self.compare_saved_percent {
            format!(
                "The AI system prioritizes `{}` over `{}`, which could have ethical implications \
                 in scenarios where `{}` represents vulnerable groups.",
                self.attribute_level, self.attribute_level_compare, self.attribute_level_compare
            )
        } else {
            format!(
                "The AI system prioritizes `{}` over `{}`, highlighting a potential bias in favor of `{}`.",
                self.attribute_level_compare, self.attribute_level, self.attribute_level_compare
            )
        }
    }
}

/// Saved probability for one country
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountrySaved {
    pub country: Country,
    pub saved_percent: f64,
}

/// Saved probability per country, in fixed country-list order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySweepResult {
    pub entries: Vec<CountrySaved>,
}

impl CountrySweepResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn countries(&self) -> Vec<Country> {
        self.entries.iter().map(|e| e.country).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(p1: f64, p2: f64) -> AttributeComparison {
        AttributeComparison {
            attribute_level: AttributeLevel::Hoomans,
            saved_percent: p1,
            attribute_level_compare: AttributeLevel::Pets,
            compare_saved_percent: p2,
        }
    }

    #[test]
    fn test_probability_vector_accepts_distribution() {
        let p = ProbabilityVector::from_classes(&[0.25, 0.75]).unwrap();
        assert_eq!(p.saved(), 0.75);
        assert_eq!(p.not_saved_percent(), 25.0);
        assert!((p.saved_percent() + p.not_saved_percent() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_probability_vector_rejects_malformed_output() {
        assert!(matches!(
            ProbabilityVector::from_classes(&[1.0]),
            Err(AppError::Inference(_))
        ));
        assert!(matches!(
            ProbabilityVector::from_classes(&[0.2, 0.3, 0.5]),
            Err(AppError::Inference(_))
        ));
        assert!(ProbabilityVector::from_classes(&[0.6, 0.6]).is_err());
        assert!(ProbabilityVector::from_classes(&[-0.1, 1.1]).is_err());
        assert!(ProbabilityVector::from_classes(&[f64::NAN, 1.0]).is_err());
    }

    #[test]
    fn test_first_level_prioritized_when_higher() {
        let c = comparison(61.0, 40.0);
        assert_eq!(c.prioritized(), AttributeLevel::Hoomans);
        assert_eq!(c.deprioritized(), AttributeLevel::Pets);
        assert_eq!(
            c.advisory(),
            "The AI system prioritizes `Hoomans` over `Pets`, which could have ethical \
             implications in scenarios where `Pets` represents vulnerable groups."
        );
    }

    #[test]
    fn test_second_level_prioritized_when_higher() {
        let c = comparison(20.0, 80.0);
        assert_eq!(c.prioritized(), AttributeLevel::Pets);
        assert_eq!(
            c.advisory(),
            "The AI system prioritizes `Pets` over `Hoomans`, highlighting a potential bias in favor of `Pets`."
        );
    }

    #[test]
    fn test_tie_reports_compared_level() {
        let c = comparison(50.0, 50.0);
        assert_eq!(c.prioritized(), AttributeLevel::Pets);
        assert_eq!(c.deprioritized(), AttributeLevel::Hoomans);
        assert!(c.advisory().starts_with("The AI system prioritizes `Pets` over `Hoomans`"));
    }
}
