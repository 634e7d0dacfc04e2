//! Stratified train/test split.

use super::ModelError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of each side of the split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split rows so each class keeps its share on both sides.
///
/// The test side gets `ceil(test_size * n)` rows. Per-class test counts are
/// the proportional shares rounded down, with the leftover rows handed to the
/// classes with the largest fractional parts.
pub fn stratified_split(
    labels: &[u8],
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit, ModelError> {
    let n = labels.len();
    if n == 0 {
        return Err(ModelError::EmptyDataset);
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ModelError::InvalidTestSize(test_size));
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n - n_test;

    let mut classes: Vec<(u8, Vec<usize>)> = Vec::new();
    for (row, &label) in labels.iter().enumerate() {
        match classes.iter_mut().find(|(l, _)| *l == label) {
            Some((_, rows)) => rows.push(row),
            None => classes.push((label, vec![row])),
        }
    }
    classes.sort_by_key(|(label, _)| *label);

    if let Some((label, rows)) = classes.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(ModelError::TooFewMembers {
            label: *label,
            count: rows.len(),
        });
    }
    if n_train < classes.len() || n_test < classes.len() {
        return Err(ModelError::SplitTooSmall {
            train: n_train,
            test: n_test,
            classes: classes.len(),
        });
    }

    let allocation = allocate(&classes, n_test, n);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);
    for ((_, rows), take) in classes.iter_mut().zip(allocation) {
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..take]);
        train.extend_from_slice(&rows[take..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(TrainTestSplit { train, test })
}

/// Largest-remainder allocation of `n_test` rows across classes.
fn allocate(classes: &[(u8, Vec<usize>)], n_test: usize, n: usize) -> Vec<usize> {
    let exact: Vec<f64> = classes
        .iter()
        .map(|(_, rows)| rows.len() as f64 * n_test as f64 / n as f64)
        .collect();
    let mut counts: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let mut order: Vec<usize> = (0..classes.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.partial_cmp(&fa).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut remaining = n_test - counts.iter().sum::<usize>();
    for idx in order.into_iter().cycle() {
        if remaining == 0 {
            break;
        }
        // A class must keep at least one training row
        if counts[idx] + 1 < classes[idx].1.len() {
            counts[idx] += 1;
            remaining -= 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(negatives: usize, positives: usize) -> Vec<u8> {
        let mut y = vec![0u8; negatives];
        y.extend(vec![1u8; positives]);
        y
    }

    #[test]
    fn sizes_sum_to_dataset_and_match_ceil_rule() {
        let y = labels(5174, 1869);
        let split = stratified_split(&y, 0.3, 42).unwrap();
        assert_eq!(split.test.len(), 2113);
        assert_eq!(split.train.len(), 4930);
        assert_eq!(split.train.len() + split.test.len(), y.len());
    }

    #[test]
    fn class_proportions_are_preserved() {
        let y = labels(5174, 1869);
        let split = stratified_split(&y, 0.3, 42).unwrap();
        let test_pos = split.test.iter().filter(|&&i| y[i] == 1).count();
        let train_pos = split.train.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(test_pos, 561);
        assert_eq!(train_pos, 1308);
    }

    #[test]
    fn every_row_appears_exactly_once() {
        let y = labels(40, 17);
        let split = stratified_split(&y, 0.3, 1).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..y.len()).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_split() {
        let y = labels(30, 12);
        assert_eq!(
            stratified_split(&y, 0.3, 42).unwrap(),
            stratified_split(&y, 0.3, 42).unwrap()
        );
        assert_ne!(
            stratified_split(&y, 0.3, 42).unwrap(),
            stratified_split(&y, 0.3, 7).unwrap()
        );
    }

    #[test]
    fn single_member_class_is_rejected() {
        let y = labels(10, 1);
        assert!(matches!(
            stratified_split(&y, 0.3, 42),
            Err(ModelError::TooFewMembers { label: 1, count: 1 })
        ));
    }
}
