//! Data Cleaning Module
//! Coerces `TotalCharges` to numbers, imputes blanks and derives `Churn_flag`.

use super::loader::{DataLoader, LoaderError};
use super::table::Table;
use super::{CHURN, CHURN_FLAG, TOTAL_CHARGES};
use crate::stats::StatsCalculator;
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleaningError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{0}' has no numeric values to impute from")]
    NoNumericValues(String),
    #[error("Row {row}: expected Churn to be Yes or No, found {value:?}")]
    UnexpectedLabel { row: usize, value: Option<String> },
}

/// What the cleaning step changed.
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningSummary {
    pub rows: usize,
    pub imputed: usize,
    pub median: f64,
}

/// Produces the cleaned dataset consumed by every downstream section.
pub struct DataCleaner;

impl DataCleaner {
    /// Return a cleaned copy of `df`.
    pub fn clean(df: &DataFrame) -> Result<(DataFrame, CleaningSummary), CleaningError> {
        let charges = Self::coerce_numeric(Self::column(df, TOTAL_CHARGES)?)?;
        let present: Vec<f64> = charges.iter().flatten().copied().collect();
        if present.is_empty() {
            return Err(CleaningError::NoNumericValues(TOTAL_CHARGES.to_string()));
        }

        let median = StatsCalculator::compute_descriptive_stats(&present).median;
        let imputed = charges.len() - present.len();
        let filled: Vec<f64> = charges.iter().map(|v| v.unwrap_or(median)).collect();

        let flags = Self::churn_flags(Self::column(df, CHURN)?)?;

        let mut cleaned = df.clone();
        cleaned.with_column(Column::new(TOTAL_CHARGES.into(), filled))?;
        cleaned.with_column(Column::new(CHURN_FLAG.into(), flags))?;

        tracing::info!(rows = df.height(), imputed, median, "cleaned dataset");
        Ok((
            cleaned,
            CleaningSummary {
                rows: df.height(),
                imputed,
                median,
            },
        ))
    }

    /// Load the raw file, clean it, persist the result and return it as a table.
    pub fn clean_and_persist(
        raw_path: &Path,
        clean_path: &Path,
    ) -> Result<(Table, CleaningSummary), CleaningError> {
        let raw = DataLoader::load_csv(raw_path)?;
        let (mut cleaned, summary) = Self::clean(&raw)?;
        DataLoader::write_csv(&mut cleaned, clean_path)?;
        let table = DataLoader::to_table(&cleaned)?;
        Ok((table, summary))
    }

    /// Parse a column as numbers; anything unparseable becomes missing.
    fn coerce_numeric(column: &Column) -> Result<Vec<Option<f64>>, CleaningError> {
        let series = column.as_materialized_series();
        if matches!(series.dtype(), DataType::String) {
            return Ok(series
                .str()?
                .into_iter()
                .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect());
        }

        let as_f64 = series.cast(&DataType::Float64)?;
        Ok(as_f64
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    fn churn_flags(column: &Column) -> Result<Vec<i64>, CleaningError> {
        let series = column.as_materialized_series();
        series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some("Yes") => Ok(1),
                Some("No") => Ok(0),
                other => Err(CleaningError::UnexpectedLabel {
                    row,
                    value: other.map(str::to_string),
                }),
            })
            .collect()
    }

    fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, CleaningError> {
        df.column(name)
            .map_err(|_| LoaderError::MissingColumn(name.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame(charges: Vec<&str>, churn: Vec<&str>) -> DataFrame {
        DataFrame::new(vec![
            Column::new(TOTAL_CHARGES.into(), charges),
            Column::new(CHURN.into(), churn),
        ])
        .unwrap()
    }

    #[test]
    fn blanks_take_the_median_of_parsed_values() {
        let df = raw_frame(vec!["10.0", " ", "30.0", "20.0"], vec!["No", "Yes", "No", "Yes"]);
        let (cleaned, summary) = DataCleaner::clean(&df).unwrap();

        assert_eq!(summary.imputed, 1);
        assert_eq!(summary.median, 20.0);
        let charges: Vec<Option<f64>> = cleaned
            .column(TOTAL_CHARGES)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(charges, vec![Some(10.0), Some(20.0), Some(30.0), Some(20.0)]);
    }

    #[test]
    fn churn_flag_is_one_only_for_yes() {
        let df = raw_frame(vec!["1", "2", "3"], vec!["Yes", "No", "Yes"]);
        let (cleaned, _) = DataCleaner::clean(&df).unwrap();
        let flags: Vec<Option<i64>> = cleaned
            .column(CHURN_FLAG)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(flags, vec![Some(1), Some(0), Some(1)]);
    }

    #[test]
    fn unknown_churn_label_is_rejected() {
        let df = raw_frame(vec!["1", "2"], vec!["No", "Maybe"]);
        let err = DataCleaner::clean(&df).unwrap_err();
        assert!(matches!(err, CleaningError::UnexpectedLabel { row: 1, .. }));
    }

    #[test]
    fn all_blank_charges_cannot_be_imputed() {
        let df = raw_frame(vec![" ", ""], vec!["No", "Yes"]);
        assert!(matches!(
            DataCleaner::clean(&df),
            Err(CleaningError::NoNumericValues(_))
        ));
    }

    #[test]
    fn missing_column_is_named() {
        let df = DataFrame::new(vec![Column::new(CHURN.into(), vec!["No"])]).unwrap();
        match DataCleaner::clean(&df) {
            Err(CleaningError::Loader(LoaderError::MissingColumn(name))) => {
                assert_eq!(name, TOTAL_CHARGES)
            }
            other => panic!("unexpected result: {:?}", other.map(|(_, s)| s)),
        }
    }
}
