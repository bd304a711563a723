use crate::error::{AppError, Result};
use crate::ml::features::{FeatureRow, FeatureValue};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use validator::Validate;

/// Column names the model was trained on
pub mod columns {
    pub const PEDPED: &str = "pedped";
    pub const BARRIER: &str = "barrier";
    pub const CROSSING_SIGNAL: &str = "crossingsignal";
    pub const ATTRIBUTE_LEVEL: &str = "attribute_level";
    pub const USER_COUNTRY: &str = "user_country_3";
    pub const REVIEW_POLITICAL: &str = "review_political";
    pub const REVIEW_RELIGIOUS: &str = "review_religious";
}

/// Type of entity at risk in a scenario
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum AttributeLevel {
    Hoomans,
    Pets,
    Female,
    Male,
    High,
    Low,
    Young,
    Old,
    Rand,
}

impl AttributeLevel {
    /// All levels in form order
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// Respondent country code
#[allow(clippy::upper_case_acronyms)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum Country {
    USA,
    CAN,
    SGP,
    CHN,
    GBR,
    ISR,
    FRA,
    DEU,
    JPN,
    KOR,
}

impl Country {
    /// All countries in sweep order
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// Scenario fields as submitted by the form.
///
/// `user_country_3` is optional on the wire because the country sweep
/// supplies its own; single predictions and comparisons require it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScenarioForm {
    #[validate(range(max = 1))]
    pub pedped: u8,

    #[validate(range(max = 1))]
    pub barrier: u8,

    #[validate(range(max = 2))]
    pub crossingsignal: u8,

    pub attribute_level: AttributeLevel,

    #[serde(default)]
    pub user_country_3: Option<Country>,

    #[validate(range(max = 1))]
    pub review_political: u8,

    #[validate(range(max = 1))]
    pub review_religious: u8,
}

impl ScenarioForm {
    /// Validate every field and build a complete request
    pub fn into_request(self) -> Result<PredictionRequest> {
        self.validate()?;
        let country = self.user_country_3.ok_or_else(|| {
            AppError::Validation("user_country_3: a country is required".to_string())
        })?;
        Ok(self.build(country))
    }

    /// Validate and build the base request for a country sweep.
    ///
    /// The sweep overwrites the country, so a missing one falls back to the
    /// first entry of the fixed list.
    pub fn into_sweep_base(self) -> Result<PredictionRequest> {
        self.validate()?;
        let country = self.user_country_3.unwrap_or(Country::USA);
        Ok(self.build(country))
    }

    fn build(&self, country: Country) -> PredictionRequest {
        PredictionRequest {
            pedped: self.pedped,
            barrier: self.barrier,
            crossingsignal: self.crossingsignal,
            attribute_level: self.attribute_level,
            user_country_3: country,
            review_political: self.review_political,
            review_religious: self.review_religious,
        }
    }
}

/// Scenario plus a second attribute level to compare against
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompareForm {
    #[serde(flatten)]
    #[validate(nested)]
    pub scenario: ScenarioForm,

    pub attribute_level_compare: AttributeLevel,
}

/// A fully validated single-row prediction request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionRequest {
    pub pedped: u8,
    pub barrier: u8,
    pub crossingsignal: u8,
    pub attribute_level: AttributeLevel,
    pub user_country_3: Country,
    pub review_political: u8,
    pub review_religious: u8,
}

impl PredictionRequest {
    /// Same scenario with a different attribute level
    pub fn with_attribute_level(&self, attribute_level: AttributeLevel) -> Self {
        Self {
            attribute_level,
            ..self.clone()
        }
    }

    /// Same scenario with a different country
    pub fn with_country(&self, user_country_3: Country) -> Self {
        Self {
            user_country_3,
            ..self.clone()
        }
    }

    /// Tabular row handed to the predictor
    pub fn to_feature_row(&self) -> FeatureRow {
        FeatureRow::new()
            .with(columns::PEDPED, FeatureValue::Numeric(self.pedped as f64))
            .with(columns::BARRIER, FeatureValue::Numeric(self.barrier as f64))
            .with(
                columns::CROSSING_SIGNAL,
                FeatureValue::Numeric(self.crossingsignal as f64),
            )
            .with(
                columns::ATTRIBUTE_LEVEL,
                FeatureValue::Categorical(self.attribute_level.to_string()),
            )
            .with(
                columns::USER_COUNTRY,
                FeatureValue::Categorical(self.user_country_3.to_string()),
            )
            .with(
                columns::REVIEW_POLITICAL,
                FeatureValue::Numeric(self.review_political as f64),
            )
            .with(
                columns::REVIEW_RELIGIOUS,
                FeatureValue::Numeric(self.review_religious as f64),
            )
    }
}
