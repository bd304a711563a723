use crate::error::{AppError, Result};
use crate::ml::artifact::FeatureSchema;
use ndarray::Array1;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Value of a single input column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
}

/// One named tabular input row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureRow {
    values: HashMap<String, FeatureValue>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: FeatureValue) -> Self {
        self.values.insert(column.to_string(), value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.values.get(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Column transformer: numeric passthrough followed by one-hot blocks.
///
/// Numeric columns keep their declared order. Categorical columns follow in
/// column-name order, each expanded over its declared categories. A category
/// not seen at training time encodes as an all-zero block.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    numeric: Vec<String>,
    categorical: BTreeMap<String, Vec<String>>,
    n_features: usize,
}

impl OneHotEncoder {
    pub fn from_schema(schema: &FeatureSchema) -> Self {
        let n_features = schema.numeric.len()
            + schema
                .categorical
                .values()
                .map(|categories| categories.len())
                .sum::<usize>();

        Self {
            numeric: schema.numeric.clone(),
            categorical: schema.categorical.clone(),
            n_features,
        }
    }

    /// Width of the encoded vector
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Names of the encoded columns, `column_category` for one-hot slots
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric.clone();
        for (column, categories) in &self.categorical {
            names.extend(categories.iter().map(|c| format!("{}_{}", column, c)));
        }
        names
    }

    /// Encode a row into the model's feature vector
    pub fn transform(&self, row: &FeatureRow) -> Result<Array1<f64>> {
        let mut encoded = Array1::zeros(self.n_features);
        let mut offset = 0;

        for column in &self.numeric {
            match row.get(column) {
                Some(FeatureValue::Numeric(v)) => encoded[offset] = *v,
                Some(FeatureValue::Categorical(v)) => {
                    return Err(AppError::Inference(format!(
                        "column '{}' expects a number, got '{}'",
                        column, v
                    )))
                }
                None => {
                    return Err(AppError::Inference(format!(
                        "column '{}' missing from input row",
                        column
                    )))
                }
            }
            offset += 1;
        }

        for (column, categories) in &self.categorical {
            match row.get(column) {
                Some(FeatureValue::Categorical(v)) => {
                    if let Some(position) = categories.iter().position(|c| c == v) {
                        encoded[offset + position] = 1.0;
                    }
                }
                Some(FeatureValue::Numeric(v)) => {
                    return Err(AppError::Inference(format!(
                        "column '{}' expects a category, got {}",
                        column, v
                    )))
                }
                None => {
                    return Err(AppError::Inference(format!(
                        "column '{}' missing from input row",
                        column
                    )))
                }
            }
            offset += categories.len();
        }

        Ok(encoded)
    }
}
