//! End-to-end section runs over a small Telco-shaped dataset.

use churn_dashboard::config::AppConfig;
use churn_dashboard::data::{DataLoader, LoaderError, CHURN, CHURN_FLAG, TOTAL_CHARGES};
use churn_dashboard::report::{build_section, Block, ReportError, Section, SectionReport};
use std::fmt::Write as _;
use std::path::Path;
use tempfile::TempDir;

const ROWS: usize = 60;

/// Rows 0 and 30 have a blank `TotalCharges`; every third customer churns.
fn write_raw_csv(path: &Path, rows: usize) {
    let mut csv = String::from(
        "customerID,gender,SeniorCitizen,Partner,tenure,Contract,MonthlyCharges,TotalCharges,Churn\n",
    );
    let contracts = ["Month-to-month", "One year", "Two year", "Month-to-month"];
    for i in 0..rows {
        let tenure = (i * 7) % 73;
        let monthly = 20.5 + ((i * 13) % 80) as f64;
        let total = if i % 30 == 0 {
            " ".to_string()
        } else {
            format!("{:.2}", tenure as f64 * monthly)
        };
        writeln!(
            csv,
            "{:04}-CUST,{},{},{},{},{},{:.2},{},{}",
            i,
            if i % 2 == 0 { "Male" } else { "Female" },
            u8::from(i % 5 == 0),
            if i % 3 == 1 { "Yes" } else { "No" },
            tenure,
            contracts[i % 4],
            monthly,
            total,
            if i % 3 == 0 { "Yes" } else { "No" },
        )
        .unwrap();
    }
    std::fs::write(path, csv).unwrap();
}

fn setup() -> (TempDir, AppConfig) {
    setup_with_rows(ROWS)
}

fn setup_with_rows(rows: usize) -> (TempDir, AppConfig) {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("Telco_Customer_Churn.csv");
    write_raw_csv(&raw, rows);
    let config = AppConfig {
        raw_data_path: raw,
        clean_data_path: dir.path().join("clean_churn.csv"),
        n_estimators: 10,
        ..AppConfig::default()
    };
    (dir, config)
}

fn texts(report: &SectionReport) -> Vec<&str> {
    report
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::Text(t) | Block::Preformatted(t) => Some(t.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn cleaning_imputes_median_and_derives_flag() {
    let (_dir, config) = setup();
    let report = build_section(Section::DataCleaning, &config).unwrap();
    assert!(report
        .blocks
        .iter()
        .any(|b| matches!(b, Block::Success(s) if s.contains("clean_churn.csv"))));

    let clean = DataLoader::load_table(&config.clean_data_path).unwrap();
    assert_eq!(clean.height(), ROWS);

    let charges = clean.numbers(TOTAL_CHARGES).unwrap();
    assert!(charges.iter().all(|v| v.is_some()));
    assert_eq!(charges[0], charges[30]);

    let mut present: Vec<f64> = (0..ROWS)
        .filter(|i| i % 30 != 0)
        .map(|i| {
            let tenure = (i * 7) % 73;
            let monthly = 20.5 + ((i * 13) % 80) as f64;
            format!("{:.2}", tenure as f64 * monthly).parse::<f64>().unwrap()
        })
        .collect();
    present.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = present.len() / 2;
    let median = (present[mid - 1] + present[mid]) / 2.0;
    assert!((charges[0].unwrap() - median).abs() < 1e-6);

    let churn = clean.text(CHURN).unwrap();
    let flags = clean.numbers(CHURN_FLAG).unwrap();
    for (label, flag) in churn.iter().zip(flags) {
        let expected = if label.as_deref() == Some("Yes") { 1.0 } else { 0.0 };
        assert_eq!(*flag, Some(expected));
    }
}

#[test]
fn split_section_reports_stratified_shapes() {
    let (_dir, config) = setup();
    build_section(Section::DataCleaning, &config).unwrap();

    let report = build_section(Section::PreprocessingSplit, &config).unwrap();
    let lines = texts(&report);
    // customerID stays in as a one-hot encoded feature
    assert!(lines.contains(&"Train shape: (42, 8)"));
    assert!(lines.contains(&"Test shape: (18, 8)"));

    // 20 churners of 60: 6 land in the test split, 14 in training
    let balance = report.tables()[0];
    assert_eq!(balance.rows[1][..4], ["Train", "42", "28", "14"]);
    assert_eq!(balance.rows[2][..4], ["Test", "18", "12", "6"]);
}

#[test]
fn tenure_groups_cover_every_customer() {
    let (_dir, config) = setup();
    build_section(Section::DataCleaning, &config).unwrap();

    let report = build_section(Section::TenureGroupAnalysis, &config).unwrap();
    let table = report.tables()[0];
    let groups: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(groups, ["0-12", "13-24", "25-48", "49-72"]);

    let counted: usize = table
        .rows
        .iter()
        .flat_map(|r| r[1..r.len() - 1].iter())
        .map(|c| c.parse::<usize>().unwrap())
        .sum();
    assert_eq!(counted, ROWS);
}

#[test]
fn training_is_reproducible() {
    let (_dir, config) = setup();
    build_section(Section::DataCleaning, &config).unwrap();

    let first = build_section(Section::ModelTraining, &config).unwrap();
    let second = build_section(Section::ModelTraining, &config).unwrap();
    assert_eq!(first, second);

    let lines = texts(&first);
    assert!(lines.contains(&"Logistic Regression Report:"));
    assert!(lines.contains(&"Random Forest Report:"));
    assert!(lines.iter().any(|l| l.contains("precision    recall  f1-score   support")));
}

#[test]
fn every_section_builds_after_cleaning() {
    let (_dir, config) = setup();
    build_section(Section::DataCleaning, &config).unwrap();

    for section in Section::ALL {
        let report = build_section(section, &config)
            .unwrap_or_else(|e| panic!("{} failed: {e}", section.label()));
        assert_eq!(report.heading, section.heading());
        assert!(!report.blocks.is_empty(), "{} is empty", section.label());
    }
}

#[test]
fn univariate_skips_identifier_column() {
    let (_dir, config) = setup();
    build_section(Section::DataCleaning, &config).unwrap();

    let report = build_section(Section::UnivariateAnalysis, &config).unwrap();
    let titles: Vec<&str> = report.charts().iter().map(|c| c.title.as_str()).collect();
    assert!(!titles.contains(&"customerID"));
    assert!(titles.contains(&"Contract"));
    assert!(titles.contains(&"tenure"));
}

#[test]
fn data_sections_report_missing_clean_file() {
    let (_dir, config) = setup();
    for section in [Section::Eda, Section::FeatureEngineering, Section::ModelTraining] {
        let err = build_section(section, &config).unwrap_err();
        assert!(
            matches!(err, ReportError::Loader(LoaderError::NotFound(_))),
            "{}: {err}",
            section.label()
        );
    }
}

#[test]
fn feature_lists_keep_identifier_and_drop_labels() {
    let (_dir, config) = setup();
    build_section(Section::DataCleaning, &config).unwrap();

    let report = build_section(Section::FeatureEngineering, &config).unwrap();
    let lines = texts(&report);
    assert!(lines[0].starts_with("Categorical Columns: [\"customerID\""));
    assert!(lines.iter().all(|l| !l.contains("\"Churn\"") && !l.contains("Churn_flag")));
}

#[test]
fn recleaning_while_sections_read_the_clean_file() {
    const LARGE: usize = 20_000;
    let (_dir, config) = setup_with_rows(LARGE);
    build_section(Section::DataCleaning, &config).unwrap();

    let writer_config = config.clone();
    let writer = std::thread::spawn(move || {
        for _ in 0..15 {
            build_section(Section::DataCleaning, &writer_config).unwrap();
        }
    });

    let mut reads = 0;
    while !writer.is_finished() || reads < 20 {
        let clean = DataLoader::load_table(&config.clean_data_path).unwrap();
        assert_eq!(clean.height(), LARGE);
        if reads % 5 == 0 {
            build_section(Section::FeatureEngineering, &config).unwrap();
        }
        reads += 1;
    }
    writer.join().unwrap();
}

#[test]
fn overview_lists_pandas_style_dtypes() {
    let (_dir, config) = setup();
    let report = build_section(Section::DatasetOverview, &config).unwrap();

    let dtypes = report.tables()[1];
    let lookup = |name: &str| {
        dtypes
            .rows
            .iter()
            .find(|r| r[0] == name)
            .map(|r| r[1].as_str())
            .unwrap()
    };
    assert_eq!(lookup("customerID"), "object");
    assert_eq!(lookup("tenure"), "int64");
    assert_eq!(lookup("MonthlyCharges"), "float64");
    // Blank entries keep the raw column textual
    assert_eq!(lookup(TOTAL_CHARGES), "object");
}
