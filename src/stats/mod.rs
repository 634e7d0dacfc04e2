//! Stats module - Descriptive statistics and correlation

mod calculator;

pub use calculator::{
    BoxStats, CategoricalSummary, HistogramBin, NumericSummary, StatsCalculator, WHISKER_IQR,
};
