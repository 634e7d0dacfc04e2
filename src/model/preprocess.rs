//! Column preprocessing: one-hot encoding for categoricals, standard scaling
//! for numerics. Output columns are the encoded categoricals followed by the
//! scaled numerics.

#![allow(non_snake_case)]

use super::features::FeatureSet;
use super::ModelError;
use ndarray::Array2;

/// One-hot encoder with sorted training categories.
///
/// Categories unseen during fitting (and missing values) encode to all zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit(columns: &[Vec<Option<String>>]) -> Self {
        let categories = columns
            .iter()
            .map(|col| {
                let mut values: Vec<String> = col.iter().flatten().cloned().collect();
                values.sort();
                values.dedup();
                values
            })
            .collect();
        Self { categories }
    }

    pub fn n_outputs(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Write encoded columns into `out` starting at column 0.
    fn transform_into(&self, columns: &[Vec<Option<String>>], out: &mut Array2<f64>) {
        let mut offset = 0;
        for (col, cats) in columns.iter().zip(self.categories.iter()) {
            for (row, value) in col.iter().enumerate() {
                if let Some(pos) = value
                    .as_ref()
                    .and_then(|v| cats.binary_search(v).ok())
                {
                    out[[row, offset + pos]] = 1.0;
                }
            }
            offset += cats.len();
        }
    }
}

/// Standardizes with training mean and population standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(columns: &[Vec<Option<f64>>], names: &[String]) -> Result<Self, ModelError> {
        let mut mean = Vec::with_capacity(columns.len());
        let mut scale = Vec::with_capacity(columns.len());

        for (col, name) in columns.iter().zip(names.iter()) {
            let values = Self::complete(col, name)?;
            if values.is_empty() {
                return Err(ModelError::EmptyDataset);
            }
            let n = values.len() as f64;
            let m = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();

            mean.push(m);
            // Avoid division by zero for constant columns
            scale.push(if std < 1e-10 { 1.0 } else { std });
        }

        Ok(Self { mean, scale })
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    fn transform_into(
        &self,
        columns: &[Vec<Option<f64>>],
        names: &[String],
        out: &mut Array2<f64>,
        offset: usize,
    ) -> Result<(), ModelError> {
        for (j, (col, name)) in columns.iter().zip(names.iter()).enumerate() {
            let values = Self::complete(col, name)?;
            for (row, v) in values.into_iter().enumerate() {
                out[[row, offset + j]] = (v - self.mean[j]) / self.scale[j];
            }
        }
        Ok(())
    }

    fn complete(col: &[Option<f64>], name: &str) -> Result<Vec<f64>, ModelError> {
        col.iter()
            .enumerate()
            .map(|(row, v)| match v {
                Some(x) if !x.is_nan() => Ok(*x),
                _ => Err(ModelError::MissingValue {
                    column: name.to_string(),
                    row,
                }),
            })
            .collect()
    }
}

/// Fitted column transformer for a `FeatureSet` layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessor {
    categorical_names: Vec<String>,
    numeric_names: Vec<String>,
    encoder: OneHotEncoder,
    scaler: StandardScaler,
}

impl Preprocessor {
    pub fn fit(features: &FeatureSet) -> Result<Self, ModelError> {
        if features.n_samples() == 0 {
            return Err(ModelError::EmptyDataset);
        }
        Ok(Self {
            categorical_names: features.categorical_names.clone(),
            numeric_names: features.numeric_names.clone(),
            encoder: OneHotEncoder::fit(&features.categorical),
            scaler: StandardScaler::fit(&features.numeric, &features.numeric_names)?,
        })
    }

    pub fn n_outputs(&self) -> usize {
        self.encoder.n_outputs() + self.numeric_names.len()
    }

    /// Output column names, `column_category` for one-hot outputs.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .categorical_names
            .iter()
            .zip(self.encoder.categories())
            .flat_map(|(name, cats)| cats.iter().map(move |c| format!("{name}_{c}")))
            .collect();
        names.extend(self.numeric_names.iter().cloned());
        names
    }

    pub fn transform(&self, features: &FeatureSet) -> Result<Array2<f64>, ModelError> {
        if features.categorical_names != self.categorical_names
            || features.numeric_names != self.numeric_names
        {
            return Err(ModelError::ColumnMismatch);
        }

        let mut X = Array2::zeros((features.n_samples(), self.n_outputs()));
        self.encoder.transform_into(&features.categorical, &mut X);
        self.scaler.transform_into(
            &features.numeric,
            &self.numeric_names,
            &mut X,
            self.encoder.n_outputs(),
        )?;
        Ok(X)
    }

    pub fn fit_transform(features: &FeatureSet) -> Result<(Self, Array2<f64>), ModelError> {
        let preprocessor = Self::fit(features)?;
        let X = preprocessor.transform(features)?;
        Ok((preprocessor, X))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(contracts: &[&str], tenure: &[f64]) -> FeatureSet {
        FeatureSet {
            categorical_names: vec!["Contract".into()],
            numeric_names: vec!["tenure".into()],
            categorical: vec![contracts.iter().map(|c| Some(c.to_string())).collect()],
            numeric: vec![tenure.iter().map(|t| Some(*t)).collect()],
            labels: vec![0; tenure.len()],
        }
    }

    #[test]
    fn encodes_sorted_categories_then_scaled_numerics() {
        let train = features(&["Two year", "Month-to-month", "Two year"], &[1.0, 2.0, 3.0]);
        let (pre, X) = Preprocessor::fit_transform(&train).unwrap();

        assert_eq!(
            pre.feature_names(),
            vec!["Contract_Month-to-month", "Contract_Two year", "tenure"]
        );
        assert_eq!(X.shape(), &[3, 3]);
        assert_eq!(X.row(0).to_vec()[..2], [0.0, 1.0]);
        assert_eq!(X.row(1).to_vec()[..2], [1.0, 0.0]);

        let scaled: Vec<f64> = X.column(2).to_vec();
        assert!((scaled.iter().sum::<f64>()).abs() < 1e-12);
        assert!((scaled[2] - 1.224_744_871).abs() < 1e-6);
    }

    #[test]
    fn unknown_categories_encode_to_zeros() {
        let train = features(&["Two year", "Month-to-month"], &[1.0, 2.0]);
        let test = features(&["One year"], &[1.5]);
        let pre = Preprocessor::fit(&train).unwrap();
        let X = pre.transform(&test).unwrap();
        assert_eq!(X.row(0).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn constant_numeric_column_is_centered_not_divided_by_zero() {
        let train = features(&["a", "b"], &[5.0, 5.0]);
        let (_, X) = Preprocessor::fit_transform(&train).unwrap();
        assert_eq!(X.column(2).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn missing_numeric_value_is_an_error() {
        let mut train = features(&["a", "b"], &[1.0, 2.0]);
        train.numeric[0][1] = None;
        assert!(matches!(
            Preprocessor::fit(&train),
            Err(ModelError::MissingValue { row: 1, .. })
        ));
    }
}
