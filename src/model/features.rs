//! Feature/label extraction from the cleaned table.

use super::ModelError;
use crate::data::{ColumnValues, Table, CHURN, CHURN_FLAG};

/// Label columns, never used as model inputs. Every other column, the
/// customer identifier included, is a feature.
pub const EXCLUDED_COLUMNS: [&str; 2] = [CHURN, CHURN_FLAG];

/// Feature columns split by kind, plus the binary churn label.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub categorical_names: Vec<String>,
    pub numeric_names: Vec<String>,
    /// One vector per categorical column.
    pub categorical: Vec<Vec<Option<String>>>,
    /// One vector per numeric column.
    pub numeric: Vec<Vec<Option<f64>>>,
    pub labels: Vec<u8>,
}

impl FeatureSet {
    pub fn from_table(table: &Table) -> Result<Self, ModelError> {
        let labels = Self::labels(table)?;
        let features = table.without_columns(&EXCLUDED_COLUMNS);

        let mut set = FeatureSet {
            categorical_names: Vec::new(),
            numeric_names: Vec::new(),
            categorical: Vec::new(),
            numeric: Vec::new(),
            labels,
        };
        for column in features.columns() {
            match &column.values {
                ColumnValues::Text(values) => {
                    set.categorical_names.push(column.name.clone());
                    set.categorical.push(values.clone());
                }
                ColumnValues::Number(values) => {
                    set.numeric_names.push(column.name.clone());
                    set.numeric.push(values.clone());
                }
            }
        }
        Ok(set)
    }

    fn labels(table: &Table) -> Result<Vec<u8>, ModelError> {
        table
            .numbers(CHURN_FLAG)?
            .iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(v) if *v == 0.0 => Ok(0),
                Some(v) if *v == 1.0 => Ok(1),
                other => Err(ModelError::InvalidLabel {
                    row,
                    value: *other,
                }),
            })
            .collect()
    }

    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.categorical_names.len() + self.numeric_names.len()
    }

    /// `(rows, feature columns)` before encoding.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_samples(), self.n_features())
    }

    /// Subset of rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> FeatureSet {
        FeatureSet {
            categorical_names: self.categorical_names.clone(),
            numeric_names: self.numeric_names.clone(),
            categorical: self
                .categorical
                .iter()
                .map(|col| rows.iter().map(|&r| col[r].clone()).collect())
                .collect(),
            numeric: self
                .numeric
                .iter()
                .map(|col| rows.iter().map(|&r| col[r]).collect())
                .collect(),
            labels: rows.iter().map(|&r| self.labels[r]).collect(),
        }
    }

    /// Number of samples per class, `[negatives, positives]`.
    pub fn class_counts(&self) -> [usize; 2] {
        let positives = self.labels.iter().filter(|&&l| l == 1).count();
        [self.labels.len() - positives, positives]
    }
}
