//! Typed Table Module
//! Column-oriented view of a loaded CSV split into text and numeric columns.

use super::loader::LoaderError;
use std::collections::{HashMap, HashSet};

/// Values held by one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Text(Vec<Option<String>>),
    Number(Vec<Option<f64>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Text(v) => v.len(),
            ColumnValues::Number(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column with the dtype label it was loaded with.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub dtype: String,
    pub values: ColumnValues,
}

impl TableColumn {
    pub fn text(name: &str, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.to_string(),
            dtype: "object".to_string(),
            values: ColumnValues::Text(values),
        }
    }

    pub fn number(name: &str, dtype: &str, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.to_string(),
            dtype: dtype.to_string(),
            values: ColumnValues::Number(values),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Number(_))
    }

    fn is_integer(&self) -> bool {
        self.dtype.starts_with('i') || self.dtype.starts_with('u')
    }

    /// Render a single cell the way it appears in preview tables.
    pub fn display(&self, row: usize) -> String {
        match &self.values {
            ColumnValues::Text(v) => v.get(row).cloned().flatten().unwrap_or_default(),
            ColumnValues::Number(v) => match v.get(row).copied().flatten() {
                Some(x) if self.is_integer() => format!("{}", x as i64),
                Some(x) => format!("{}", x),
                None => "NaN".to_string(),
            },
        }
    }
}

/// Loaded dataset with a fixed row count shared by all columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<TableColumn>,
    height: usize,
}

impl Table {
    pub fn from_columns(columns: Vec<TableColumn>) -> Result<Self, LoaderError> {
        let height = columns.first().map(|c| c.values.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.values.len() != height) {
            return Err(LoaderError::ColumnLength {
                column: bad.name.clone(),
                expected: height,
                found: bad.values.len(),
            });
        }
        Ok(Self { columns, height })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn text(&self, name: &str) -> Result<&[Option<String>], LoaderError> {
        match self.column(name).map(|c| &c.values) {
            Some(ColumnValues::Text(v)) => Ok(v),
            Some(ColumnValues::Number(_)) => Err(LoaderError::WrongKind {
                column: name.to_string(),
                expected: "text",
            }),
            None => Err(LoaderError::MissingColumn(name.to_string())),
        }
    }

    pub fn numbers(&self, name: &str) -> Result<&[Option<f64>], LoaderError> {
        match self.column(name).map(|c| &c.values) {
            Some(ColumnValues::Number(v)) => Ok(v),
            Some(ColumnValues::Text(_)) => Err(LoaderError::WrongKind {
                column: name.to_string(),
                expected: "numeric",
            }),
            None => Err(LoaderError::MissingColumn(name.to_string())),
        }
    }

    /// Copy of the table without the named columns; unknown names are ignored.
    pub fn without_columns(&self, names: &[&str]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .filter(|c| !names.contains(&c.name.as_str()))
                .cloned()
                .collect(),
            height: self.height,
        }
    }

    /// First `n` rows rendered as strings.
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        (0..n.min(self.height))
            .map(|row| self.columns.iter().map(|c| c.display(row)).collect())
            .collect()
    }

    /// Rows identical to an earlier row in every column.
    pub fn duplicate_count(&self) -> usize {
        let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(self.height);
        (0..self.height)
            .filter(|&row| {
                let key: Vec<String> = self.columns.iter().map(|c| c.display(row)).collect();
                !seen.insert(key)
            })
            .count()
    }

    /// Non-null values of a text column with counts, in order of first appearance.
    pub fn category_counts(&self, name: &str) -> Result<Vec<(String, usize)>, LoaderError> {
        Ok(count_in_order(self.text(name)?.iter().flatten()))
    }
}

/// Count occurrences, keeping the order in which values first appear.
pub fn count_in_order<'a>(values: impl Iterator<Item = &'a String>) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match index.get(value.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.as_str(), counts.len());
                counts.push((value.clone(), 1));
            }
        }
    }
    counts
}
