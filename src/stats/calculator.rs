//! Statistics Calculator Module
//! Descriptive summaries, distribution shapes and Pearson correlation.

use rayon::prelude::*;
use statrs::distribution::{Continuous, Normal};
use std::cmp::Ordering;

use crate::data::count_in_order;

/// Whisker reach in multiples of the interquartile range.
pub const WHISKER_IQR: f64 = 1.5;

/// Describe-style summary of a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for NumericSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Describe-style summary of a text column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: String,
    pub freq: usize,
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> NumericSummary {
        let n = values.len();
        if n == 0 {
            return NumericSummary::default();
        }

        let sorted = Self::sorted(values);

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let std = if n > 1 {
            (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        NumericSummary {
            count: n,
            mean,
            std,
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median,
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Count, distinct values and most frequent value of a text column.
    pub fn summarize_categories(values: &[Option<String>]) -> CategoricalSummary {
        let counts = count_in_order(values.iter().flatten());
        let count = counts.iter().map(|(_, c)| c).sum();

        // First value reaching the maximum wins ties
        let (top, freq) = counts
            .iter()
            .fold(None::<&(String, usize)>, |best, item| match best {
                Some(b) if b.1 >= item.1 => Some(b),
                _ => Some(item),
            })
            .map(|(v, c)| (v.clone(), *c))
            .unwrap_or_default();

        CategoricalSummary {
            count,
            unique: counts.len(),
            top,
            freq,
        }
    }

    /// Quartiles, whiskers and outliers for a box plot.
    pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
        if values.is_empty() {
            return None;
        }

        let sorted = Self::sorted(values);
        let q1 = Self::percentile(&sorted, 25.0);
        let median = Self::percentile(&sorted, 50.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < low_fence || v > high_fence)
            .collect();

        Some(BoxStats {
            whisker_low,
            q1,
            median,
            q3,
            whisker_high,
            outliers,
        })
    }

    /// Equal-width histogram between min and max; the last bin is closed.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        if values.is_empty() || bins == 0 {
            return Vec::new();
        }

        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: lo + i as f64 * width,
                end: lo + (i + 1) as f64 * width,
                count,
            })
            .collect()
    }

    /// Gaussian kernel density over the data range, scaled to histogram counts.
    ///
    /// Bandwidth follows Scott's rule; `bin_width` converts density into the
    /// expected count per bin so the curve overlays a count histogram.
    pub fn kde_curve(values: &[f64], points: usize, bin_width: f64) -> Vec<[f64; 2]> {
        let n = values.len();
        if n < 2 || points < 2 {
            return Vec::new();
        }

        let stats = Self::compute_descriptive_stats(values);
        let bandwidth = stats.std * (n as f64).powf(-0.2);
        if !(bandwidth > 0.0) {
            return Vec::new();
        }
        let Ok(kernel) = Normal::new(0.0, 1.0) else {
            return Vec::new();
        };

        let step = (stats.max - stats.min) / (points - 1) as f64;
        let scale = bin_width / bandwidth;

        (0..points)
            .into_par_iter()
            .map(|i| {
                let x = stats.min + i as f64 * step;
                let density: f64 = values
                    .iter()
                    .map(|&v| kernel.pdf((x - v) / bandwidth))
                    .sum();
                [x, density * scale]
            })
            .collect()
    }

    /// Pearson correlation over rows where both values are present.
    pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
        let pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(y.iter())
            .filter_map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
                _ => None,
            })
            .collect();

        let n = pairs.len();
        if n < 2 {
            return f64::NAN;
        }

        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for &(a, b) in &pairs {
            let dx = a - mean_x;
            let dy = b - mean_y;
            sxy += dx * dy;
            sxx += dx * dx;
            syy += dy * dy;
        }

        if sxx == 0.0 || syy == 0.0 {
            return f64::NAN;
        }
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    }

    /// Full correlation matrix, rows computed in parallel.
    ///
    /// The diagonal goes through `pearson` as well, so a constant column is NaN there.
    pub fn correlation_matrix(columns: &[&[Option<f64>]]) -> Vec<Vec<f64>> {
        (0..columns.len())
            .into_par_iter()
            .map(|i| {
                (0..columns.len())
                    .map(|j| Self::pearson(columns[i], columns[j]))
                    .collect()
            })
            .collect()
    }

    fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_matches_numpy_percentiles() {
        let stats = StatsCalculator::compute_descriptive_stats(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.p25, 1.75);
        assert_eq!(stats.p75, 3.25);
        assert!((stats.std - 1.2909944).abs() < 1e-6);
    }

    #[test]
    fn empty_input_gives_nan_summary() {
        let stats = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn categorical_summary_picks_most_frequent() {
        let values = vec![
            Some("Month-to-month".to_string()),
            Some("Two year".to_string()),
            None,
            Some("Month-to-month".to_string()),
        ];
        let summary = StatsCalculator::summarize_categories(&values);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.unique, 2);
        assert_eq!(summary.top, "Month-to-month");
        assert_eq!(summary.freq, 2);
    }

    #[test]
    fn box_stats_flag_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let stats = StatsCalculator::box_stats(&values).unwrap();
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.whisker_high, 5.0);
        assert_eq!(stats.whisker_low, 1.0);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values: Vec<f64> = (0..=72).map(f64::from).collect();
        let bins = StatsCalculator::histogram(&values, 30);
        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].start, 0.0);
        assert!((bins[29].end - 72.0).abs() < 1e-9);
    }

    #[test]
    fn constant_histogram_uses_unit_range() {
        let bins = StatsCalculator::histogram(&[5.0, 5.0], 2);
        assert_eq!(bins[0].start, 4.5);
        assert_eq!(bins[1].end, 5.5);
    }

    #[test]
    fn kde_has_requested_resolution() {
        let values: Vec<f64> = (0..50).map(|i| (i % 10) as f64).collect();
        let curve = StatsCalculator::kde_curve(&values, 100, 1.0);
        assert_eq!(curve.len(), 100);
        assert!(curve.iter().all(|p| p[1] > 0.0));
        assert!(StatsCalculator::kde_curve(&[1.0, 1.0, 1.0], 100, 1.0).is_empty());
    }

    #[test]
    fn kde_spans_exactly_the_data_range() {
        let values = [2.0, 3.0, 3.5, 7.0, 9.0];
        let curve = StatsCalculator::kde_curve(&values, 50, 1.0);
        assert!((curve[0][0] - 2.0).abs() < 1e-12);
        assert!((curve[49][0] - 9.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_handles_perfect_and_missing_pairs() {
        let x = vec![Some(1.0), Some(2.0), Some(3.0), None];
        let y = vec![Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        assert!((StatsCalculator::pearson(&x, &y) - 1.0).abs() < 1e-12);

        let flat = vec![Some(1.0), Some(1.0), Some(1.0), Some(1.0)];
        assert!(StatsCalculator::pearson(&x, &flat).is_nan());
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let a = vec![Some(1.0), Some(2.0), Some(3.0), Some(5.0)];
        let b = vec![Some(3.0), Some(1.0), Some(2.0), Some(0.0)];
        let m = StatsCalculator::correlation_matrix(&[&a, &b]);
        assert!((m[0][0] - 1.0).abs() < 1e-12);
        assert!((m[1][1] - 1.0).abs() < 1e-12);
        assert!((m[0][1] - m[1][0]).abs() < 1e-12);
        assert!(m[0][1] < 0.0);
    }

    #[test]
    fn constant_column_has_undefined_diagonal() {
        let a = vec![Some(1.0), Some(2.0), Some(4.0)];
        let flat = vec![Some(7.0), Some(7.0), Some(7.0)];
        let m = StatsCalculator::correlation_matrix(&[&a, &flat]);
        assert!((m[0][0] - 1.0).abs() < 1e-12);
        assert!(m[1][1].is_nan());
        assert!(m[0][1].is_nan() && m[1][0].is_nan());
    }
}
