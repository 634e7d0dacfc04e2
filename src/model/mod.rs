//! Model module - Feature preparation, baseline classifiers and evaluation

#![allow(non_snake_case)]

mod features;
mod forest;
mod logistic;
mod metrics;
mod preprocess;
mod split;

pub use features::{FeatureSet, EXCLUDED_COLUMNS};
pub use forest::{DecisionTree, ForestParams, RandomForest};
pub use logistic::LogisticRegression;
pub use metrics::{roc_auc, ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use preprocess::{OneHotEncoder, Preprocessor, StandardScaler};
pub use split::{stratified_split, TrainTestSplit};

use crate::config::AppConfig;
use crate::data::{LoaderError, Table};
use ndarray::{Array1, Array2};
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("Dataset has no rows")]
    EmptyDataset,
    #[error("test_size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),
    #[error("Class {label} has only {count} member(s); stratified split needs at least 2")]
    TooFewMembers { label: u8, count: usize },
    #[error("Split of {train} train / {test} test rows cannot hold all {classes} classes")]
    SplitTooSmall {
        train: usize,
        test: usize,
        classes: usize,
    },
    #[error("Row {row}: label must be 0 or 1, found {value:?}")]
    InvalidLabel { row: usize, value: Option<f64> },
    #[error("Column '{column}' has a missing value at row {row}")]
    MissingValue { column: String, row: usize },
    #[error("Feature columns differ from the ones the preprocessor was fitted on")]
    ColumnMismatch,
    #[error("Expected {expected} values, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("Linear system is singular")]
    SingularMatrix,
    #[error("Model has not been fitted")]
    NotFitted,
}

/// Binary classifier over a dense feature matrix.
pub trait Classifier {
    fn name(&self) -> &'static str;

    fn fit(&mut self, X: &Array2<f64>, y: &[u8]) -> Result<(), ModelError>;

    /// Probability of the positive class for every row.
    fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, ModelError>;

    fn predict(&self, X: &Array2<f64>) -> Result<Vec<u8>, ModelError> {
        Ok(self
            .predict_proba(X)?
            .iter()
            .map(|&p| u8::from(p > 0.5))
            .collect())
    }
}

/// Split and model parameters taken from the dashboard config.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSettings {
    pub test_size: f64,
    pub random_state: u64,
    pub n_estimators: usize,
    pub max_iter: usize,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for TrainingSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            test_size: config.test_size,
            random_state: config.random_state,
            n_estimators: config.n_estimators,
            max_iter: config.max_iter,
        }
    }
}

/// Features of the cleaned table split into train and test sides.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub features: FeatureSet,
    pub split: TrainTestSplit,
    pub train: FeatureSet,
    pub test: FeatureSet,
}

/// Extract features and apply the stratified split.
pub fn prepare(table: &Table, settings: &TrainingSettings) -> Result<PreparedData, ModelError> {
    let features = FeatureSet::from_table(table)?;
    let split = stratified_split(&features.labels, settings.test_size, settings.random_state)?;
    let train = features.select(&split.train);
    let test = features.select(&split.test);

    tracing::info!(
        train = train.n_samples(),
        test = test.n_samples(),
        features = features.n_features(),
        "stratified split"
    );
    Ok(PreparedData {
        features,
        split,
        train,
        test,
    })
}

/// Test-set results of one fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEvaluation {
    pub model: String,
    pub report: ClassificationReport,
    pub confusion: ConfusionMatrix,
    pub roc_auc: Option<f64>,
}

impl ModelEvaluation {
    /// Fit on the training matrix and score the test matrix.
    pub fn fit_and_score(
        model: &mut dyn Classifier,
        X_train: &Array2<f64>,
        y_train: &[u8],
        X_test: &Array2<f64>,
        y_test: &[u8],
    ) -> Result<Self, ModelError> {
        let start = Instant::now();
        model.fit(X_train, y_train)?;
        let proba = model.predict_proba(X_test)?.to_vec();
        let predicted: Vec<u8> = proba.iter().map(|&p| u8::from(p > 0.5)).collect();

        let evaluation = Self {
            model: model.name().to_string(),
            report: ClassificationReport::from_predictions(y_test, &predicted),
            confusion: ConfusionMatrix::from_predictions(y_test, &predicted),
            roc_auc: roc_auc(y_test, &proba),
        };
        tracing::info!(
            model = %evaluation.model,
            accuracy = evaluation.report.accuracy,
            roc_auc = ?evaluation.roc_auc,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "model evaluated"
        );
        Ok(evaluation)
    }
}

/// Logistic regression and random forest with the configured parameters.
pub fn baseline_models(settings: &TrainingSettings) -> Vec<Box<dyn Classifier>> {
    vec![
        Box::new(LogisticRegression::new(1.0, settings.max_iter)),
        Box::new(RandomForest::new(ForestParams {
            n_trees: settings.n_estimators,
            seed: settings.random_state,
            ..ForestParams::default()
        })),
    ]
}

/// Split, preprocess on the training side, fit both baselines and score them.
pub fn train_and_evaluate(
    table: &Table,
    settings: &TrainingSettings,
) -> Result<Vec<ModelEvaluation>, ModelError> {
    let prepared = prepare(table, settings)?;
    let (preprocessor, X_train) = Preprocessor::fit_transform(&prepared.train)?;
    let X_test = preprocessor.transform(&prepared.test)?;
    tracing::debug!(encoded_features = preprocessor.n_outputs(), "preprocessed features");

    baseline_models(settings)
        .into_iter()
        .map(|mut model| {
            ModelEvaluation::fit_and_score(
                model.as_mut(),
                &X_train,
                &prepared.train.labels,
                &X_test,
                &prepared.test.labels,
            )
        })
        .collect()
}
