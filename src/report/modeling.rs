//! Model sections: feature lists, the stratified split and baseline training.

use super::{Block, DataTable, ReportError, Section, SectionReport};
use crate::config::AppConfig;
use crate::data::DataLoader;
use crate::model::{self, FeatureSet, ModelEvaluation, TrainingSettings};

fn shape((rows, cols): (usize, usize)) -> String {
    format!("({rows}, {cols})")
}

pub(super) fn feature_engineering(config: &AppConfig) -> Result<SectionReport, ReportError> {
    let table = DataLoader::load_table(&config.clean_data_path)?;
    let features = FeatureSet::from_table(&table)?;

    let mut report = SectionReport::new(Section::FeatureEngineering);
    report.text(format!("Categorical Columns: {:?}", features.categorical_names));
    report.text(format!("Numerical Columns: {:?}", features.numeric_names));
    Ok(report)
}

pub(super) fn train_test_split(config: &AppConfig) -> Result<SectionReport, ReportError> {
    let table = DataLoader::load_table(&config.clean_data_path)?;
    let prepared = model::prepare(&table, &TrainingSettings::from(config))?;

    let mut report = SectionReport::new(Section::PreprocessingSplit);
    report.text(format!("Train shape: {}", shape(prepared.train.shape())));
    report.text(format!("Test shape: {}", shape(prepared.test.shape())));

    report.subheader("Class Balance");
    let mut balance = DataTable::new(
        ["Split", "Rows", "Churn_flag = 0", "Churn_flag = 1", "Churn rate (%)"]
            .map(String::from)
            .to_vec(),
    );
    for (name, set) in [
        ("Full", &prepared.features),
        ("Train", &prepared.train),
        ("Test", &prepared.test),
    ] {
        let [negatives, positives] = set.class_counts();
        let rate = positives as f64 * 100.0 / set.n_samples().max(1) as f64;
        balance.push_row(vec![
            name.to_string(),
            set.n_samples().to_string(),
            negatives.to_string(),
            positives.to_string(),
            format!("{rate:.2}"),
        ]);
    }
    report.push(Block::Table(balance));
    Ok(report)
}

fn confusion_table(evaluation: &ModelEvaluation) -> DataTable {
    let counts = evaluation.confusion.counts;
    let mut table = DataTable::new(
        ["", "Predicted 0", "Predicted 1"]
            .map(String::from)
            .to_vec(),
    );
    for (actual, row) in counts.iter().enumerate() {
        table.push_row(vec![
            format!("Actual {actual}"),
            row[0].to_string(),
            row[1].to_string(),
        ]);
    }
    table
}

pub(super) fn training(config: &AppConfig) -> Result<SectionReport, ReportError> {
    let table = DataLoader::load_table(&config.clean_data_path)?;
    let evaluations = model::train_and_evaluate(&table, &TrainingSettings::from(config))?;

    let mut report = SectionReport::new(Section::ModelTraining);
    for evaluation in &evaluations {
        report.text(format!("{} Report:", evaluation.model));
        report.push(Block::Preformatted(evaluation.report.to_string()));
        report.push(Block::Table(confusion_table(evaluation)));
        report.text(match evaluation.roc_auc {
            Some(auc) => format!("ROC AUC: {auc:.3}"),
            None => "ROC AUC: undefined (test split has a single class)".to_string(),
        });
    }
    Ok(report)
}
