//! Report module - Builds the content of each dashboard section
//!
//! Handlers load their input, run one fixed computation and return an
//! ordered list of display blocks. They never touch the UI.

mod analysis;
mod modeling;
mod section;
mod static_text;

pub use section::Section;

use crate::charts::ChartSpec;
use crate::config::AppConfig;
use crate::data::{CleaningError, LoaderError};
use crate::model::ModelError;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Cleaning(#[from] CleaningError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Header row plus string cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

/// One displayable element of a section.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Subheader(String),
    Text(String),
    /// Lines of `- item` bullets and `**bold**` lines.
    Markdown(String),
    Code { language: String, source: String },
    Success(String),
    Table(DataTable),
    /// Monospaced text shown verbatim.
    Preformatted(String),
    Chart(ChartSpec),
}

/// Ordered content of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    pub section: Section,
    pub heading: String,
    pub blocks: Vec<Block>,
}

impl SectionReport {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            heading: section.heading(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    pub fn subheader(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Block::Subheader(text.into()))
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Block::Text(text.into()))
    }

    pub fn charts(&self) -> Vec<&ChartSpec> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Chart(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    pub fn tables(&self) -> Vec<&DataTable> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(table) => Some(table),
                _ => None,
            })
            .collect()
    }
}

/// Run the handler of exactly one section.
pub fn build_section(section: Section, config: &AppConfig) -> Result<SectionReport, ReportError> {
    if let Some(report) = static_text::build(section) {
        return Ok(report);
    }

    let start = Instant::now();
    let report = match section {
        Section::DatasetOverview => analysis::dataset_overview(config)?,
        Section::DataCleaning => analysis::data_cleaning(config)?,
        Section::Eda => analysis::churn_distribution(config)?,
        Section::UnivariateAnalysis => analysis::univariate(config)?,
        Section::BivariateAnalysis => analysis::bivariate(config)?,
        Section::TenureGroupAnalysis => analysis::tenure_groups(config)?,
        Section::MultivariateAnalysis => analysis::multivariate(config)?,
        Section::FeatureEngineering => modeling::feature_engineering(config)?,
        Section::PreprocessingSplit => modeling::train_test_split(config)?,
        Section::ModelTraining => modeling::training(config)?,
        // Static sections returned above
        _ => SectionReport::new(section),
    };

    tracing::info!(
        section = section.label(),
        blocks = report.blocks.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "section built"
    );
    Ok(report)
}

/// Describe-style number formatting: NaN for missing, up to six decimals.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let text = format!("{value:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
