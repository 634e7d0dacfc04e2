//! Data Processor Module
//! Grouping helpers shared by the analysis sections: tenure buckets,
//! value counts and per-churn splits.

use super::loader::LoaderError;
use super::table::{count_in_order, Table};
use std::collections::HashMap;
use std::fmt;

/// Ordinal bucket over customer tenure in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TenureGroup {
    UpToYear,
    SecondYear,
    ThirdToFourthYear,
    FifthToSixthYear,
}

impl TenureGroup {
    pub const ALL: [TenureGroup; 4] = [
        TenureGroup::UpToYear,
        TenureGroup::SecondYear,
        TenureGroup::ThirdToFourthYear,
        TenureGroup::FifthToSixthYear,
    ];

    /// Right-inclusive bins (-1,12], (12,24], (24,48], (48,72].
    pub fn from_tenure(tenure: f64) -> Option<Self> {
        if tenure.is_nan() || tenure <= -1.0 || tenure > 72.0 {
            return None;
        }
        Some(if tenure <= 12.0 {
            TenureGroup::UpToYear
        } else if tenure <= 24.0 {
            TenureGroup::SecondYear
        } else if tenure <= 48.0 {
            TenureGroup::ThirdToFourthYear
        } else {
            TenureGroup::FifthToSixthYear
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            TenureGroup::UpToYear => "0-12",
            TenureGroup::SecondYear => "13-24",
            TenureGroup::ThirdToFourthYear => "25-48",
            TenureGroup::FifthToSixthYear => "49-72",
        }
    }
}

impl fmt::Display for TenureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counts of `(category, hue)` pairs laid out for a grouped bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    pub categories: Vec<String>,
    pub hues: Vec<String>,
    /// `counts[h][c]` is the number of rows with hue `h` and category `c`.
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    /// Build from paired values, skipping rows where either side is missing.
    /// Categories and hues keep their order of first appearance unless given.
    pub fn from_pairs<'a>(
        pairs: impl Iterator<Item = (Option<&'a str>, Option<&'a str>)>,
        categories: Option<Vec<String>>,
    ) -> Self {
        let pairs: Vec<(&str, &str)> = pairs
            .filter_map(|(c, h)| Some((c?, h?)))
            .collect();

        let categories = categories.unwrap_or_else(|| {
            let owned: Vec<String> = pairs.iter().map(|(c, _)| c.to_string()).collect();
            count_in_order(owned.iter()).into_iter().map(|(c, _)| c).collect()
        });
        let hue_values: Vec<String> = pairs.iter().map(|(_, h)| h.to_string()).collect();
        let hues: Vec<String> = count_in_order(hue_values.iter())
            .into_iter()
            .map(|(h, _)| h)
            .collect();

        let cat_index: HashMap<&str, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let hue_index: HashMap<&str, usize> = hues
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();

        let mut counts = vec![vec![0usize; categories.len()]; hues.len()];
        for (c, h) in pairs {
            if let (Some(&ci), Some(&hi)) = (cat_index.get(c), hue_index.get(h)) {
                counts[hi][ci] += 1;
            }
        }

        Self {
            categories,
            hues,
            counts,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

/// Handles grouping and reshaping of the cleaned table.
pub struct DataProcessor;

impl DataProcessor {
    /// Value counts of a text column, most frequent first.
    pub fn value_counts(table: &Table, column: &str) -> Result<Vec<(String, usize)>, LoaderError> {
        let mut counts = table.category_counts(column)?;
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(counts)
    }

    /// Value counts as percentages of the non-missing rows.
    pub fn value_percentages(
        table: &Table,
        column: &str,
    ) -> Result<Vec<(String, f64)>, LoaderError> {
        let counts = Self::value_counts(table, column)?;
        let total: usize = counts.iter().map(|(_, c)| c).sum();
        Ok(counts
            .into_iter()
            .map(|(v, c)| (v, c as f64 * 100.0 / total.max(1) as f64))
            .collect())
    }

    /// Counts of a text column split by a hue column.
    pub fn crosstab(table: &Table, column: &str, hue: &str) -> Result<CrossTab, LoaderError> {
        let values = table.text(column)?;
        let hues = table.text(hue)?;
        Ok(CrossTab::from_pairs(
            values
                .iter()
                .zip(hues.iter())
                .map(|(v, h)| (v.as_deref(), h.as_deref())),
            None,
        ))
    }

    /// Tenure buckets for every row; `None` where tenure is missing or out of range.
    pub fn tenure_groups(
        table: &Table,
        tenure_column: &str,
    ) -> Result<Vec<Option<TenureGroup>>, LoaderError> {
        Ok(table
            .numbers(tenure_column)?
            .iter()
            .map(|t| t.and_then(TenureGroup::from_tenure))
            .collect())
    }

    /// Tenure bucket counts split by a hue column, buckets in ordinal order.
    pub fn tenure_crosstab(
        table: &Table,
        tenure_column: &str,
        hue: &str,
    ) -> Result<CrossTab, LoaderError> {
        let groups = Self::tenure_groups(table, tenure_column)?;
        let hues = table.text(hue)?;
        let categories = TenureGroup::ALL.iter().map(|g| g.label().to_string()).collect();
        Ok(CrossTab::from_pairs(
            groups
                .iter()
                .zip(hues.iter())
                .map(|(g, h)| (g.map(TenureGroup::label), h.as_deref())),
            Some(categories),
        ))
    }

    /// Non-missing numeric values grouped by a text column, groups in first-seen order.
    pub fn numbers_by_group(
        table: &Table,
        column: &str,
        group: &str,
    ) -> Result<Vec<(String, Vec<f64>)>, LoaderError> {
        let values = table.numbers(column)?;
        let groups = table.text(group)?;

        let mut order: Vec<(String, Vec<f64>)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for (value, key) in values.iter().zip(groups.iter()) {
            let (Some(v), Some(k)) = (value, key) else {
                continue;
            };
            if v.is_nan() {
                continue;
            }
            let slot = *index.entry(k.as_str()).or_insert_with(|| {
                order.push((k.clone(), Vec::new()));
                order.len() - 1
            });
            order[slot].1.push(*v);
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TableColumn;

    fn churn_table() -> Table {
        Table::from_columns(vec![
            TableColumn::number(
                "tenure",
                "int64",
                vec![Some(0.0), Some(12.0), Some(13.0), Some(48.0), Some(72.0), None],
            ),
            TableColumn::text(
                "Churn",
                ["Yes", "No", "No", "Yes", "No", "No"]
                    .iter()
                    .map(|s| Some(s.to_string()))
                    .collect(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn tenure_breakpoints_are_right_inclusive() {
        assert_eq!(TenureGroup::from_tenure(0.0), Some(TenureGroup::UpToYear));
        assert_eq!(TenureGroup::from_tenure(12.0), Some(TenureGroup::UpToYear));
        assert_eq!(TenureGroup::from_tenure(13.0), Some(TenureGroup::SecondYear));
        assert_eq!(TenureGroup::from_tenure(24.0), Some(TenureGroup::SecondYear));
        assert_eq!(TenureGroup::from_tenure(25.0), Some(TenureGroup::ThirdToFourthYear));
        assert_eq!(TenureGroup::from_tenure(48.0), Some(TenureGroup::ThirdToFourthYear));
        assert_eq!(TenureGroup::from_tenure(49.0), Some(TenureGroup::FifthToSixthYear));
        assert_eq!(TenureGroup::from_tenure(72.0), Some(TenureGroup::FifthToSixthYear));
        assert_eq!(TenureGroup::from_tenure(73.0), None);
        assert_eq!(TenureGroup::from_tenure(f64::NAN), None);
    }

    #[test]
    fn every_tenure_in_range_has_exactly_one_group() {
        for months in 0..=72 {
            let t = months as f64;
            assert!(TenureGroup::from_tenure(t).is_some());
            let matching = TenureGroup::ALL
                .iter()
                .filter(|g| {
                    let (lo, hi) = match g {
                        TenureGroup::UpToYear => (-1.0, 12.0),
                        TenureGroup::SecondYear => (12.0, 24.0),
                        TenureGroup::ThirdToFourthYear => (24.0, 48.0),
                        TenureGroup::FifthToSixthYear => (48.0, 72.0),
                    };
                    t > lo && t <= hi
                })
                .count();
            assert_eq!(matching, 1);
        }
    }

    #[test]
    fn tenure_crosstab_uses_ordinal_order_and_skips_missing() {
        let tab = DataProcessor::tenure_crosstab(&churn_table(), "tenure", "Churn").unwrap();
        assert_eq!(tab.categories, vec!["0-12", "13-24", "25-48", "49-72"]);
        assert_eq!(tab.hues, vec!["Yes", "No"]);
        assert_eq!(tab.counts[0], vec![1, 0, 1, 0]);
        assert_eq!(tab.counts[1], vec![1, 1, 0, 1]);
        assert_eq!(tab.total(), 5);
    }

    #[test]
    fn value_counts_sort_descending() {
        let counts = DataProcessor::value_counts(&churn_table(), "Churn").unwrap();
        assert_eq!(counts, vec![("No".to_string(), 4), ("Yes".to_string(), 2)]);

        let pct = DataProcessor::value_percentages(&churn_table(), "Churn").unwrap();
        assert!((pct[0].1 - 66.666_666).abs() < 1e-3);
    }

    #[test]
    fn numbers_grouped_by_churn() {
        let groups = DataProcessor::numbers_by_group(&churn_table(), "tenure", "Churn").unwrap();
        assert_eq!(groups[0], ("Yes".to_string(), vec![0.0, 48.0]));
        assert_eq!(groups[1], ("No".to_string(), vec![12.0, 13.0, 72.0]));
    }
}
