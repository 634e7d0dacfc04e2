//! Charts module - Chart descriptions, interactive plotting and PNG export

mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::{ChartRenderer, RenderError};

use crate::stats::{BoxStats, HistogramBin};

/// Series colors as RGB triples, shared by the egui and PNG backends.
pub const PALETTE: [(u8, u8, u8); 10] = [
    (52, 152, 219),  // Blue
    (231, 76, 60),   // Red
    (46, 204, 113),  // Green
    (155, 89, 182),  // Purple
    (243, 156, 18),  // Orange
    (26, 188, 156),  // Teal
    (233, 30, 99),   // Pink
    (0, 188, 212),   // Cyan
    (255, 87, 34),   // Deep Orange
    (96, 125, 139),  // Blue Grey
];

/// KDE overlay color.
pub const DENSITY_COLOR: (u8, u8, u8) = (44, 62, 80);

pub fn palette_color(index: usize) -> (u8, u8, u8) {
    PALETTE[index % PALETTE.len()]
}

/// Diverging blue-white-red map for values in [-1, 1]; NaN maps to grey.
pub fn coolwarm(value: f64) -> (u8, u8, u8) {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    if value.is_nan() {
        return (128, 128, 128);
    }
    let v = value.clamp(-1.0, 1.0);
    let (from, to, t) = if v < 0.0 {
        (COLD, MID, v + 1.0)
    } else {
        (MID, WARM, v)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    (lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// One named bar series aligned with the chart's categories.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    /// Grouped bars, one series per hue value.
    Bar {
        categories: Vec<String>,
        series: Vec<Series>,
    },
    /// Count histogram with a density curve in count units.
    Histogram {
        bins: Vec<HistogramBin>,
        kde: Vec<[f64; 2]>,
    },
    /// One box per group.
    BoxPlot { groups: Vec<(String, BoxStats)> },
    /// Annotated square matrix.
    Heatmap {
        labels: Vec<String>,
        values: Vec<Vec<f64>>,
    },
}

/// Backend-independent chart description produced by the report handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
}

impl ChartSpec {
    pub fn bar(title: &str, categories: Vec<String>, series: Vec<Series>) -> Self {
        Self {
            title: title.to_string(),
            x_label: title.to_string(),
            y_label: "count".to_string(),
            kind: ChartKind::Bar { categories, series },
        }
    }

    pub fn histogram(title: &str, bins: Vec<HistogramBin>, kde: Vec<[f64; 2]>) -> Self {
        Self {
            title: title.to_string(),
            x_label: title.to_string(),
            y_label: "Count".to_string(),
            kind: ChartKind::Histogram { bins, kde },
        }
    }

    pub fn box_plot(title: &str, hue: &str, groups: Vec<(String, BoxStats)>) -> Self {
        Self {
            title: title.to_string(),
            x_label: hue.to_string(),
            y_label: title.to_string(),
            kind: ChartKind::BoxPlot { groups },
        }
    }

    pub fn heatmap(title: &str, labels: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        Self {
            title: title.to_string(),
            x_label: String::new(),
            y_label: String::new(),
            kind: ChartKind::Heatmap { labels, values },
        }
    }

    /// Largest y value the chart needs to show.
    pub fn y_max(&self) -> f64 {
        let max = match &self.kind {
            ChartKind::Bar { series, .. } => series
                .iter()
                .flat_map(|s| s.values.iter().copied())
                .fold(0.0, f64::max),
            ChartKind::Histogram { bins, kde } => bins
                .iter()
                .map(|b| b.count as f64)
                .chain(kde.iter().map(|p| p[1]))
                .fold(0.0, f64::max),
            ChartKind::BoxPlot { groups } => groups
                .iter()
                .flat_map(|(_, b)| b.outliers.iter().copied().chain([b.whisker_high]))
                .fold(f64::NEG_INFINITY, f64::max),
            ChartKind::Heatmap { labels, .. } => labels.len() as f64,
        };
        if max.is_finite() {
            max
        } else {
            1.0
        }
    }
}
