//! Classification metrics: per-class report, confusion matrix, ROC AUC.

use std::cmp::Ordering;
use std::fmt;

const AVERAGE_WIDTH: usize = "weighted avg".len();

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision/recall/F1 plus accuracy and averages.
///
/// `Display` renders the familiar fixed-width text layout with two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Build from true and predicted binary labels. Zero divisions yield 0.
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        let confusion = ConfusionMatrix::from_predictions(y_true, y_pred);
        let total = y_true.len();

        let classes: Vec<ClassMetrics> = (0..2u8)
            .filter(|&c| confusion.support(c) > 0 || confusion.predicted(c) > 0)
            .map(|c| {
                let tp = confusion.counts[c as usize][c as usize];
                let precision = ratio(tp, confusion.predicted(c));
                let recall = ratio(tp, confusion.support(c));
                ClassMetrics {
                    label: c.to_string(),
                    precision,
                    recall,
                    f1: f1_score(precision, recall),
                    support: confusion.support(c),
                }
            })
            .collect();

        let correct = confusion.counts[0][0] + confusion.counts[1][1];
        let accuracy = ratio(correct, total);

        let k = classes.len().max(1) as f64;
        let macro_avg = ClassMetrics {
            label: "macro avg".to_string(),
            precision: classes.iter().map(|m| m.precision).sum::<f64>() / k,
            recall: classes.iter().map(|m| m.recall).sum::<f64>() / k,
            f1: classes.iter().map(|m| m.f1).sum::<f64>() / k,
            support: total,
        };

        let weight = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes
                    .iter()
                    .map(|m| f(m) * m.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            label: "weighted avg".to_string(),
            precision: weight(|m| m.precision),
            recall: weight(|m| m.recall),
            f1: weight(|m| m.f1),
            support: total,
        };

        Self {
            classes,
            accuracy,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|m| m.label == label)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self
            .classes
            .iter()
            .map(|m| m.label.len())
            .max()
            .unwrap_or(0)
            .max(AVERAGE_WIDTH);

        let row = |f: &mut fmt::Formatter<'_>, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support
            )
        };

        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for m in &self.classes {
            row(f, m)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.weighted_avg.support
        )?;
        row(f, &self.macro_avg)?;
        row(f, &self.weighted_avg)
    }
}

/// Binary confusion matrix, `counts[actual][predicted]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut counts = [[0usize; 2]; 2];
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            counts[(t as usize).min(1)][(p as usize).min(1)] += 1;
        }
        Self { counts }
    }

    /// Rows whose actual class is `class`.
    pub fn support(&self, class: u8) -> usize {
        self.counts[class as usize].iter().sum()
    }

    /// Rows predicted as `class`.
    pub fn predicted(&self, class: u8) -> usize {
        self.counts[0][class as usize] + self.counts[1][class as usize]
    }
}

/// Area under the ROC curve via the rank-sum statistic, ties averaged.
///
/// `None` when only one class is present.
pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> Option<f64> {
    let n_pos = y_true.iter().filter(|&&y| y == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));

    let mut rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // Ranks are 1-based; tied block i..=j shares the mean rank
        let mean_rank = (i + j) as f64 / 2.0 + 1.0;
        rank_sum += order[i..=j]
            .iter()
            .filter(|&&k| y_true[k] == 1)
            .count() as f64
            * mean_rank;
        i = j + 1;
    }

    let n_pos = n_pos as f64;
    Some((rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg as f64))
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_matches_hand_computed_values() {
        let y_true = [0, 0, 0, 0, 1, 1, 1, 1, 1, 0];
        let y_pred = [0, 0, 0, 1, 1, 1, 0, 1, 1, 0];
        let report = ClassificationReport::from_predictions(&y_true, &y_pred);

        let zero = report.class("0").unwrap();
        assert!((zero.precision - 0.8).abs() < 1e-12);
        assert!((zero.recall - 0.8).abs() < 1e-12);
        assert_eq!(zero.support, 5);
        let one = report.class("1").unwrap();
        assert!((one.precision - 0.8).abs() < 1e-12);
        assert!((one.f1 - 0.8).abs() < 1e-12);
        assert!((report.accuracy - 0.8).abs() < 1e-12);
        assert_eq!(report.weighted_avg.support, 10);
    }

    #[test]
    fn display_uses_fixed_width_layout() {
        let y_true = [0, 0, 1, 1];
        let y_pred = [0, 1, 1, 1];
        let text = ClassificationReport::from_predictions(&y_true, &y_pred).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "              precision    recall  f1-score   support"
        );
        assert_eq!(lines[1], "");
        assert_eq!(
            lines[2],
            "           0       1.00      0.50      0.67         2"
        );
        assert_eq!(
            lines[5],
            "    accuracy                           0.75         4"
        );
        assert!(lines[7].starts_with("weighted avg"));
    }

    #[test]
    fn zero_division_is_reported_as_zero() {
        let report = ClassificationReport::from_predictions(&[0, 1, 1], &[0, 0, 0]);
        let one = report.class("1").unwrap();
        assert_eq!(one.precision, 0.0);
        assert_eq!(one.f1, 0.0);
    }

    #[test]
    fn confusion_matrix_counts_by_actual_then_predicted() {
        let cm = ConfusionMatrix::from_predictions(&[0, 0, 1, 1, 1], &[0, 1, 0, 1, 1]);
        assert_eq!(cm.counts, [[1, 1], [1, 2]]);
        assert_eq!(cm.support(1), 3);
        assert_eq!(cm.predicted(1), 3);
    }

    #[test]
    fn auc_handles_perfect_random_and_tied_scores() {
        assert_eq!(roc_auc(&[0, 0, 1, 1], &[0.1, 0.2, 0.8, 0.9]), Some(1.0));
        assert_eq!(roc_auc(&[0, 0, 1, 1], &[0.9, 0.8, 0.2, 0.1]), Some(0.0));
        assert_eq!(roc_auc(&[0, 1, 0, 1], &[0.5, 0.5, 0.5, 0.5]), Some(0.5));
        assert_eq!(roc_auc(&[1, 1], &[0.3, 0.4]), None);
    }
}
