//! Fixed narrative sections.

use super::{Block, Section, SectionReport};

const PROBLEM_STATEMENT: &str = "Subscription-based businesses (telecom, streaming, SaaS) face a key \
challenge: customer churn (users canceling their service). Reducing churn is critical because \
retaining a customer is cheaper than acquiring a new one.";

const OBJECTIVE: &str = "Build a predictive model to identify customers at risk of churn and \
recommend retention strategies.";

const IMPORTS: &str = "\
use polars::prelude::*;
use ndarray::{Array1, Array2};
use statrs::distribution::Normal;
use rayon::prelude::*;
use egui_plot::{BarChart, BoxPlot, Line, Plot};";

const BUSINESS_INSIGHTS: &str = "\
- Month-to-Month contracts have highest churn (43%)
- Electronic Check payments = more churn (46%)
- Fiber Optic users churn more than DSL users (42%)";

const RETENTION_STRATEGY: &str = "Retention Calls, Coupons, and Monitoring can reduce churn risk.";

const ROI_ESTIMATE: &str = "ROI savings if churn reduces by 5%: approx $5441/year";

const FINAL_RESULTS: &str = "\
**Final Results**
- Dataset: 7043 customers, churn rate ≈ 26%
- Best model: Logistic Regression (ROC AUC ~0.84)
- High-risk customers identified: 25%
- Top churn drivers: Month-to-Month, Electronic Check, Fiber Optic
- ROI: Saving just 5% of high-value customers ≈ $5441 yearly

**Conclusion**
Predictive modeling + business insights can reduce churn and improve revenue in subscription businesses.";

/// Body of a static section; `None` for data-driven ones.
pub(super) fn build(section: Section) -> Option<SectionReport> {
    let body = match section {
        Section::ProblemStatement => vec![Block::Text(PROBLEM_STATEMENT.to_string())],
        Section::Objective => vec![Block::Text(OBJECTIVE.to_string())],
        Section::ImportLibraries => vec![
            Block::Code {
                language: "rust".to_string(),
                source: IMPORTS.to_string(),
            },
            Block::Success("✅ Libraries imported successfully!".to_string()),
        ],
        Section::BusinessInsights => vec![Block::Markdown(BUSINESS_INSIGHTS.to_string())],
        Section::RetentionStrategy => vec![Block::Text(RETENTION_STRATEGY.to_string())],
        Section::RoiEstimation => vec![Block::Text(ROI_ESTIMATE.to_string())],
        Section::FinalResults => vec![Block::Markdown(FINAL_RESULTS.to_string())],
        _ => return None,
    };

    let mut report = SectionReport::new(section);
    report.blocks.extend(body);
    Some(report)
}
