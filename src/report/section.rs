//! The seventeen dashboard sections in sidebar order.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    ProblemStatement,
    Objective,
    ImportLibraries,
    DatasetOverview,
    DataCleaning,
    Eda,
    UnivariateAnalysis,
    BivariateAnalysis,
    TenureGroupAnalysis,
    MultivariateAnalysis,
    FeatureEngineering,
    PreprocessingSplit,
    ModelTraining,
    BusinessInsights,
    RetentionStrategy,
    RoiEstimation,
    FinalResults,
}

impl Section {
    pub const ALL: [Section; 17] = [
        Section::ProblemStatement,
        Section::Objective,
        Section::ImportLibraries,
        Section::DatasetOverview,
        Section::DataCleaning,
        Section::Eda,
        Section::UnivariateAnalysis,
        Section::BivariateAnalysis,
        Section::TenureGroupAnalysis,
        Section::MultivariateAnalysis,
        Section::FeatureEngineering,
        Section::PreprocessingSplit,
        Section::ModelTraining,
        Section::BusinessInsights,
        Section::RetentionStrategy,
        Section::RoiEstimation,
        Section::FinalResults,
    ];

    /// Sidebar label.
    pub fn label(self) -> &'static str {
        match self {
            Section::ProblemStatement => "Problem Statement",
            Section::Objective => "Objective",
            Section::ImportLibraries => "Import Libraries",
            Section::DatasetOverview => "Dataset Overview",
            Section::DataCleaning => "Data Cleaning",
            Section::Eda => "EDA",
            Section::UnivariateAnalysis => "Univariate Analysis",
            Section::BivariateAnalysis => "Bivariate Analysis",
            Section::TenureGroupAnalysis => "Tenure Group Analysis",
            Section::MultivariateAnalysis => "Multivariate Analysis",
            Section::FeatureEngineering => "Feature Engineering",
            Section::PreprocessingSplit => "Preprocessing & Train-Test Split",
            Section::ModelTraining => "Model Training & Evaluation",
            Section::BusinessInsights => "Business Insights",
            Section::RetentionStrategy => "Retention Strategy",
            Section::RoiEstimation => "ROI Estimation",
            Section::FinalResults => "Final Results & Conclusion",
        }
    }

    /// Heading shown above the section body, without the number.
    pub fn title(self) -> &'static str {
        match self {
            Section::ImportLibraries => "Import Required Libraries",
            Section::DatasetOverview => "Dataset Load and Overview",
            Section::Eda => "Exploratory Data Analysis (EDA)",
            other => other.label(),
        }
    }

    /// 1-based position in the sidebar.
    pub fn number(self) -> usize {
        Section::ALL
            .iter()
            .position(|s| *s == self)
            .map_or(0, |i| i + 1)
    }

    pub fn heading(self) -> String {
        format!("{}. {}", self.number(), self.title())
    }

    /// Sections that only show fixed text and never touch a data file.
    pub fn is_static(self) -> bool {
        matches!(
            self,
            Section::ProblemStatement
                | Section::Objective
                | Section::ImportLibraries
                | Section::BusinessInsights
                | Section::RetentionStrategy
                | Section::RoiEstimation
                | Section::FinalResults
        )
    }

    /// File-name friendly identifier, e.g. `07_univariate_analysis`.
    pub fn slug(self) -> String {
        let words: Vec<String> = self
            .label()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        format!("{:02}_{}", self.number(), words.join("_"))
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Section::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_follows_sidebar_order() {
        assert_eq!(Section::ProblemStatement.number(), 1);
        assert_eq!(Section::ModelTraining.number(), 13);
        assert_eq!(Section::FinalResults.number(), 17);
        assert_eq!(Section::DatasetOverview.heading(), "4. Dataset Load and Overview");
        assert_eq!(Section::Eda.heading(), "6. Exploratory Data Analysis (EDA)");
    }

    #[test]
    fn labels_are_unique_and_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_label(section.label()), Some(section));
        }
        assert_eq!(Section::from_label("Unknown"), None);
    }

    #[test]
    fn static_sections_are_the_seven_text_pages() {
        assert_eq!(Section::ALL.iter().filter(|s| s.is_static()).count(), 7);
        assert!(!Section::DataCleaning.is_static());
    }

    #[test]
    fn slugs_are_file_name_safe() {
        assert_eq!(Section::PreprocessingSplit.slug(), "12_preprocessing_train_test_split");
        assert_eq!(Section::Eda.slug(), "06_eda");
    }
}
