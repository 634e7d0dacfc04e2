//! CSV Data Loader Module
//! Handles CSV reading/writing with Polars and conversion into a typed `Table`.

use super::table::{ColumnValues, Table, TableColumn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Column '{0}' not found")]
    MissingColumn(String),
    #[error("Column '{column}' is not {expected}")]
    WrongKind {
        column: String,
        expected: &'static str,
    },
    #[error("Column '{column}' has {found} rows, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Stateless CSV helpers; every section reads its input fresh.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file using Polars.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let path_str = path.to_string_lossy().to_string();
        let df = LazyCsvReader::new(&path_str)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        tracing::info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded csv"
        );
        Ok(df)
    }

    /// Load a CSV file straight into a `Table`.
    pub fn load_table(path: &Path) -> Result<Table, LoaderError> {
        let df = Self::load_csv(path)?;
        Self::to_table(&df)
    }

    /// Write a DataFrame as CSV with a header row.
    ///
    /// The rows go to a temporary file beside `path` that is then renamed over
    /// it, so concurrent readers see either the old file or the new one.
    pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), LoaderError> {
        let write_error = |source| LoaderError::Write {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
        CsvWriter::new(file.as_file_mut())
            .include_header(true)
            .finish(df)?;
        file.persist(path).map_err(|e| write_error(e.error))?;

        tracing::info!(path = %path.display(), rows = df.height(), "wrote csv");
        Ok(())
    }

    /// Convert every DataFrame column into a text or numeric table column.
    pub fn to_table(df: &DataFrame) -> Result<Table, LoaderError> {
        let columns = df
            .get_columns()
            .iter()
            .map(Self::convert_column)
            .collect::<Result<Vec<_>, _>>()?;
        Table::from_columns(columns)
    }

    fn convert_column(column: &Column) -> Result<TableColumn, LoaderError> {
        let name = column.name().to_string();
        let series = column.as_materialized_series();
        let dtype = series.dtype().clone();

        if is_numeric_dtype(&dtype) {
            let as_f64 = series.cast(&DataType::Float64)?;
            let values: Vec<Option<f64>> = as_f64.f64()?.into_iter().collect();
            return Ok(TableColumn::number(&name, pandas_dtype(&dtype), values));
        }

        if matches!(dtype, DataType::String) {
            let values: Vec<Option<String>> = series
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect();
            return Ok(TableColumn::text(&name, values));
        }

        // Booleans, dates and anything else are shown as text
        let values: Vec<Option<String>> = (0..series.len())
            .map(|i| {
                let val = series.get(i).ok()?;
                if val.is_null() {
                    None
                } else {
                    Some(val.to_string().trim_matches('"').to_string())
                }
            })
            .collect();
        Ok(TableColumn {
            name,
            dtype: pandas_dtype(&dtype).to_string(),
            values: ColumnValues::Text(values),
        })
    }
}

/// Dtype label in the familiar dataframe spelling (`int64`, `float64`,
/// `object`); text and anything without a direct counterpart is `object`.
pub fn pandas_dtype(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Int8 => "int8",
        DataType::Int16 => "int16",
        DataType::Int32 => "int32",
        DataType::Int64 => "int64",
        DataType::UInt8 => "uint8",
        DataType::UInt16 => "uint16",
        DataType::UInt32 => "uint32",
        DataType::UInt64 => "uint64",
        DataType::Float32 => "float32",
        DataType::Float64 => "float64",
        DataType::Boolean => "bool",
        _ => "object",
    }
}

/// Integer and floating point dtypes.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}
