//! Data sections: overview, cleaning and the exploratory charts.

use super::{format_number, Block, DataTable, ReportError, Section, SectionReport};
use crate::charts::{ChartSpec, Series};
use crate::config::AppConfig;
use crate::data::{
    CrossTab, DataCleaner, DataLoader, DataProcessor, LoaderError, Table, CHURN, CUSTOMER_ID,
    TENURE,
};
use crate::stats::{NumericSummary, StatsCalculator};
use rayon::prelude::*;

const PREVIEW_ROWS: usize = 5;
const KDE_POINTS: usize = 200;

fn preview(table: &Table) -> DataTable {
    DataTable {
        headers: table.column_names(),
        rows: table.head(PREVIEW_ROWS),
    }
}

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .collect()
}

fn load_clean(config: &AppConfig) -> Result<Table, LoaderError> {
    DataLoader::load_table(&config.clean_data_path)
}

fn crosstab_chart(title: &str, crosstab: CrossTab) -> ChartSpec {
    let series = crosstab
        .hues
        .into_iter()
        .zip(crosstab.counts)
        .map(|(name, counts)| Series {
            name,
            values: counts.into_iter().map(|c| c as f64).collect(),
        })
        .collect();
    ChartSpec::bar(title, crosstab.categories, series)
}

fn count_chart(title: &str, counts: Vec<(String, usize)>) -> ChartSpec {
    let (categories, values): (Vec<String>, Vec<f64>) =
        counts.into_iter().map(|(c, n)| (c, n as f64)).unzip();
    ChartSpec::bar(
        title,
        categories,
        vec![Series {
            name: "count".to_string(),
            values,
        }],
    )
}

pub(super) fn dataset_overview(config: &AppConfig) -> Result<SectionReport, ReportError> {
    let table = DataLoader::load_table(&config.raw_data_path)?;
    let mut report = SectionReport::new(Section::DatasetOverview);

    report.subheader("First 5 Rows");
    report.push(Block::Table(preview(&table)));

    report.subheader("Shape of Dataset");
    report.text(format!("Rows: {}, Columns: {}", table.height(), table.width()));

    report.subheader("Data Types");
    let mut dtypes = DataTable::new(vec!["Column".to_string(), "Dtype".to_string()]);
    for column in table.columns() {
        dtypes.push_row(vec![column.name.clone(), column.dtype.clone()]);
    }
    report.push(Block::Table(dtypes));

    report.subheader("Duplicate Records");
    report.text(format!("Total duplicates: {}", table.duplicate_count()));

    report.subheader("Basic Statistics Summary (Numerical Columns)");
    report.push(Block::Table(numeric_describe(&table)?));

    report.subheader("Basic Statistics Summary (Categorical Columns)");
    report.push(Block::Table(categorical_describe(&table)?));

    Ok(report)
}

/// count/mean/std/min/quartiles/max, one column per numeric field.
fn numeric_describe(table: &Table) -> Result<DataTable, LoaderError> {
    let names = table.numeric_columns();
    let summaries: Vec<NumericSummary> = names
        .par_iter()
        .map(|name| -> Result<NumericSummary, LoaderError> {
            let values = present(table.numbers(name)?);
            Ok(StatsCalculator::compute_descriptive_stats(&values))
        })
        .collect::<Result<_, LoaderError>>()?;

    let mut headers = vec![String::new()];
    headers.extend(names);
    let mut described = DataTable::new(headers);

    let rows: [(&str, fn(&NumericSummary) -> f64); 8] = [
        ("count", |s| s.count as f64),
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.p25),
        ("50%", |s| s.median),
        ("75%", |s| s.p75),
        ("max", |s| s.max),
    ];
    for (label, field) in rows {
        let mut row = vec![label.to_string()];
        row.extend(summaries.iter().map(|s| format_number(field(s))));
        described.push_row(row);
    }
    Ok(described)
}

/// count/unique/top/freq, one column per text field.
fn categorical_describe(table: &Table) -> Result<DataTable, LoaderError> {
    let names = table.categorical_columns();
    let summaries = names
        .iter()
        .map(|name| -> Result<_, LoaderError> {
            Ok(StatsCalculator::summarize_categories(table.text(name)?))
        })
        .collect::<Result<Vec<_>, LoaderError>>()?;

    let mut headers = vec![String::new()];
    headers.extend(names);
    let mut described = DataTable::new(headers);

    let mut push = |label: &str, cells: Vec<String>| {
        let mut row = vec![label.to_string()];
        row.extend(cells);
        described.push_row(row);
    };
    push("count", summaries.iter().map(|s| s.count.to_string()).collect());
    push("unique", summaries.iter().map(|s| s.unique.to_string()).collect());
    push("top", summaries.iter().map(|s| s.top.clone()).collect());
    push("freq", summaries.iter().map(|s| s.freq.to_string()).collect());
    Ok(described)
}

pub(super) fn data_cleaning(config: &AppConfig) -> Result<SectionReport, ReportError> {
    let (table, summary) =
        DataCleaner::clean_and_persist(&config.raw_data_path, &config.clean_data_path)?;
    let mut report = SectionReport::new(Section::DataCleaning);

    report.push(Block::Table(preview(&table)));
    report.text(format!(
        "TotalCharges: {} of {} values were blank or non-numeric and were filled with the median ({}).",
        summary.imputed,
        summary.rows,
        format_number(summary.median)
    ));
    report.push(Block::Success(format!(
        "✅ Data cleaned and saved as '{}'",
        config.clean_file_name()
    )));
    Ok(report)
}

pub(super) fn churn_distribution(config: &AppConfig) -> Result<SectionReport, ReportError> {
    let table = load_clean(config)?.without_columns(&[CUSTOMER_ID]);
    let mut report = SectionReport::new(Section::Eda);

    report.subheader("Churn vs Non-Churn Count");
    report.push(Block::Chart(count_chart(
        CHURN,
        DataProcessor::value_counts(&table, CHURN)?,
    )));

    report.subheader("Churn vs Non-Churn Percentage");
    let mut shares = DataTable::new(vec![CHURN.to_string(), "proportion (%)".to_string()]);
    for (value, pct) in DataProcessor::value_percentages(&table, CHURN)? {
        shares.push_row(vec![value, format!("{pct:.2}")]);
    }
    report.push(Block::Table(shares));
    Ok(report)
}

pub(super) fn univariate(config: &AppConfig) -> Result<SectionReport, ReportError> {
    let table = load_clean(config)?.without_columns(&[CUSTOMER_ID]);
    let bins = config.histogram_bins;

    let mut columns = table.categorical_columns();
    columns.extend(table.numeric_columns());

    let charts: Vec<ChartSpec> = columns
        .par_iter()
        .map(|name| -> Result<ChartSpec, LoaderError> {
            if let Ok(values) = table.numbers(name) {
                let values = present(values);
                let histogram = StatsCalculator::histogram(&values, bins);
                let bin_width = histogram.first().map_or(1.0, |b| b.end - b.start);
                let kde = StatsCalculator::kde_curve(&values, KDE_POINTS, bin_width);
                Ok(ChartSpec::histogram(name, histogram, kde))
            } else {
                Ok(count_chart(name, table.category_counts(name)?))
            }
        })
        .collect::<Result<_, _>>()?;

    let mut report = SectionReport::new(Section::UnivariateAnalysis);
    report.blocks.extend(charts.into_iter().map(Block::Chart));
    Ok(report)
}

pub(super) fn bivariate(config: &AppConfig) -> Result<SectionReport, ReportError> {
    let table = load_clean(config)?.without_columns(&[CUSTOMER_ID]);
    // Fail early when the hue column is absent or numeric
    table.text(CHURN)?;

    let mut columns = table.categorical_columns();
    columns.extend(table.numeric_columns());

    let charts: Vec<ChartSpec> = columns
        .par_iter()
        .map(|name| -> Result<ChartSpec, LoaderError> {
            if table.numbers(name).is_ok() {
                let groups = DataProcessor::numbers_by_group(&table, name, CHURN)?
                    .into_iter()
                    .filter_map(|(group, values)| {
                        StatsCalculator::box_stats(&values).map(|stats| (group, stats))
                    })
                    .collect();
                Ok(ChartSpec::box_plot(name, CHURN, groups))
            } else {
                Ok(crosstab_chart(name, DataProcessor::crosstab(&table, name, CHURN)?))
            }
        })
        .collect::<Result<_, _>>()?;

    let mut report = SectionReport::new(Section::BivariateAnalysis);
    report.blocks.extend(charts.into_iter().map(Block::Chart));
    Ok(report)
}

pub(super) fn tenure_groups(config: &AppConfig) -> Result<SectionReport, ReportError> {
    let table = load_clean(config)?;
    let crosstab = DataProcessor::tenure_crosstab(&table, TENURE, CHURN)?;
    let mut report = SectionReport::new(Section::TenureGroupAnalysis);

    let mut headers = vec!["TenureGroup".to_string()];
    headers.extend(crosstab.hues.iter().cloned());
    headers.push("Churn rate (%)".to_string());
    let mut summary = DataTable::new(headers);

    let churned = crosstab.hues.iter().position(|h| h == "Yes");
    for (c, category) in crosstab.categories.iter().enumerate() {
        let counts: Vec<usize> = crosstab.counts.iter().map(|row| row[c]).collect();
        let total: usize = counts.iter().sum();
        let rate = match churned {
            Some(h) if total > 0 => format!("{:.2}", counts[h] as f64 * 100.0 / total as f64),
            _ => "NaN".to_string(),
        };

        let mut row = vec![category.clone()];
        row.extend(counts.iter().map(usize::to_string));
        row.push(rate);
        summary.push_row(row);
    }

    report.push(Block::Chart(crosstab_chart("TenureGroup", crosstab)));
    report.push(Block::Table(summary));
    Ok(report)
}

pub(super) fn multivariate(config: &AppConfig) -> Result<SectionReport, ReportError> {
    let table = load_clean(config)?;
    let names = table.numeric_columns();
    let columns = names
        .iter()
        .map(|name| table.numbers(name))
        .collect::<Result<Vec<_>, _>>()?;
    let matrix = StatsCalculator::correlation_matrix(&columns);

    let mut report = SectionReport::new(Section::MultivariateAnalysis);
    report.push(Block::Chart(ChartSpec::heatmap(
        "Correlation Matrix",
        names,
        matrix,
    )));
    Ok(report)
}
