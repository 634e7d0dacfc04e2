//! Static Chart Renderer
//! Writes chart specs to PNG files with plotters.
//!
//! Layout per chart: caption on top, axis descriptions, a legend for
//! multi-series bar charts and value annotations on heatmap cells.

use super::{coolwarm, palette_color, ChartKind, ChartSpec, Series, DENSITY_COLOR};
use crate::stats::{BoxStats, HistogramBin};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pixel size of exported charts.
pub const EXPORT_SIZE: (u32, u32) = (1000, 700);

const CAPTION_FONT: (&str, u32) = ("sans-serif", 26);
const AXIS_FONT: (&str, u32) = ("sans-serif", 15);

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart '{title}': {message}")]
    Draw { title: String, message: String },
    #[error("Failed to create directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No charts to export")]
    NothingToExport,
}

fn failed<E: std::fmt::Display>(spec: &ChartSpec) -> impl Fn(E) -> RenderError + '_ {
    move |e| RenderError::Draw {
        title: spec.title.clone(),
        message: e.to_string(),
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

/// Renders charts to PNG files for sharing outside the dashboard.
pub struct ChartRenderer;

impl ChartRenderer {
    /// `{prefix}_{NN}_{title}.png`, with the title reduced to `[a-z0-9_]`.
    pub fn file_name(prefix: &str, index: usize, spec: &ChartSpec) -> String {
        let slug: String = spec
            .title
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        let slug = slug
            .split('_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        format!("{prefix}_{:02}_{slug}.png", index + 1)
    }

    /// Render every chart into `dir`, returning the written paths in order.
    pub fn export_all(
        charts: &[&ChartSpec],
        dir: &Path,
        prefix: &str,
    ) -> Result<Vec<PathBuf>, RenderError> {
        if charts.is_empty() {
            return Err(RenderError::NothingToExport);
        }
        std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::with_capacity(charts.len());
        for (index, spec) in charts.iter().enumerate() {
            let path = dir.join(Self::file_name(prefix, index, spec));
            Self::render_png(spec, &path, EXPORT_SIZE)?;
            written.push(path);
        }
        tracing::info!(count = written.len(), dir = %dir.display(), "exported charts");
        Ok(written)
    }

    pub fn render_png(spec: &ChartSpec, path: &Path, size: (u32, u32)) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(failed(spec))?;

        match &spec.kind {
            ChartKind::Bar { categories, series } => {
                Self::draw_bars(&root, spec, categories, series)?
            }
            ChartKind::Histogram { bins, kde } => Self::draw_histogram(&root, spec, bins, kde)?,
            ChartKind::BoxPlot { groups } => Self::draw_box_plot(&root, spec, groups)?,
            ChartKind::Heatmap { labels, values } => {
                Self::draw_heatmap(&root, spec, labels, values)?
            }
        }

        root.present().map_err(failed(spec))?;
        Ok(())
    }

    fn category_label(labels: &[String], x: f64) -> String {
        let rounded = x.round();
        if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        labels.get(rounded as usize).cloned().unwrap_or_default()
    }

    fn draw_bars(
        root: &Area,
        spec: &ChartSpec,
        categories: &[String],
        series: &[Series],
    ) -> Result<(), RenderError> {
        let n = categories.len().max(1);
        let width = 0.8 / series.len().max(1) as f64;
        let y_max = (spec.y_max() * 1.1).max(1.0);

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, CAPTION_FONT)
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
            .map_err(failed(spec))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n + 1)
            .x_label_formatter(&|x| Self::category_label(categories, *x))
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .axis_desc_style(AXIS_FONT)
            .draw()
            .map_err(failed(spec))?;

        for (s, entry) in series.iter().enumerate() {
            let color = rgb(palette_color(s));
            chart
                .draw_series(entry.values.iter().enumerate().map(|(c, &v)| {
                    let x0 = c as f64 - 0.4 + width * s as f64;
                    Rectangle::new([(x0, 0.0), (x0 + width * 0.95, v)], color.filled())
                }))
                .map_err(failed(spec))?
                .label(entry.name.clone())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        if series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(failed(spec))?;
        }
        Ok(())
    }

    fn draw_histogram(
        root: &Area,
        spec: &ChartSpec,
        bins: &[HistogramBin],
        kde: &[[f64; 2]],
    ) -> Result<(), RenderError> {
        let (lo, hi) = match (bins.first(), bins.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (0.0, 1.0),
        };
        let y_max = (spec.y_max() * 1.1).max(1.0);

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, CAPTION_FONT)
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(lo..hi, 0f64..y_max)
            .map_err(failed(spec))?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .axis_desc_style(AXIS_FONT)
            .draw()
            .map_err(failed(spec))?;

        let fill = rgb(palette_color(0));
        chart
            .draw_series(bins.iter().map(|b| {
                Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], fill.mix(0.6).filled())
            }))
            .map_err(failed(spec))?;

        if !kde.is_empty() {
            chart
                .draw_series(LineSeries::new(
                    kde.iter().map(|p| (p[0], p[1])),
                    rgb(DENSITY_COLOR).stroke_width(2),
                ))
                .map_err(failed(spec))?;
        }
        Ok(())
    }

    fn draw_box_plot(
        root: &Area,
        spec: &ChartSpec,
        groups: &[(String, BoxStats)],
    ) -> Result<(), RenderError> {
        let labels: Vec<String> = groups.iter().map(|(g, _)| g.clone()).collect();
        let n = groups.len().max(1);
        let y_min = groups
            .iter()
            .flat_map(|(_, b)| b.outliers.iter().copied().chain([b.whisker_low]))
            .fold(f64::INFINITY, f64::min);
        let y_max = spec.y_max();
        let (y_min, y_max) = if y_min.is_finite() && y_max > y_min {
            let pad = (y_max - y_min) * 0.05;
            (y_min - pad, y_max + pad)
        } else {
            (0.0, 1.0)
        };

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, CAPTION_FONT)
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)
            .map_err(failed(spec))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n + 1)
            .x_label_formatter(&|x| Self::category_label(&labels, *x))
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .axis_desc_style(AXIS_FONT)
            .draw()
            .map_err(failed(spec))?;

        for (i, (_, stats)) in groups.iter().enumerate() {
            let color = rgb(palette_color(i));
            let x = i as f64;
            let (left, right) = (x - 0.25, x + 0.25);

            chart
                .draw_series([
                    Rectangle::new([(left, stats.q1), (right, stats.q3)], color.mix(0.3).filled()),
                    Rectangle::new([(left, stats.q1), (right, stats.q3)], color.stroke_width(2)),
                ])
                .map_err(failed(spec))?;
            chart
                .draw_series([
                    PathElement::new(
                        vec![(left, stats.median), (right, stats.median)],
                        color.stroke_width(3),
                    ),
                    PathElement::new(vec![(x, stats.q3), (x, stats.whisker_high)], color),
                    PathElement::new(vec![(x, stats.q1), (x, stats.whisker_low)], color),
                    PathElement::new(
                        vec![(x - 0.1, stats.whisker_high), (x + 0.1, stats.whisker_high)],
                        color,
                    ),
                    PathElement::new(
                        vec![(x - 0.1, stats.whisker_low), (x + 0.1, stats.whisker_low)],
                        color,
                    ),
                ])
                .map_err(failed(spec))?;
            chart
                .draw_series(
                    stats
                        .outliers
                        .iter()
                        .map(|&y| Circle::new((x, y), 3, color.mix(0.7).filled())),
                )
                .map_err(failed(spec))?;
        }
        Ok(())
    }

    fn draw_heatmap(
        root: &Area,
        spec: &ChartSpec,
        labels: &[String],
        values: &[Vec<f64>],
    ) -> Result<(), RenderError> {
        let n = labels.len() as i32;

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, CAPTION_FONT)
            .margin(10)
            .x_label_area_size(80)
            .y_label_area_size(140)
            .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())
            .map_err(failed(spec))?;

        // Row 0 is drawn at the top
        let label_at = |v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(i) => labels
                .get((n - 1 - *i) as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        };
        let column_label = |v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(labels.len())
            .y_labels(labels.len())
            .x_label_formatter(&column_label)
            .y_label_formatter(&label_at)
            .draw()
            .map_err(failed(spec))?;

        for (i, row) in values.iter().enumerate() {
            let y = n - 1 - i as i32;
            for (j, &v) in row.iter().enumerate() {
                let x = j as i32;
                let fill = rgb(coolwarm(v));
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [
                            (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                            (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                        ],
                        fill.filled(),
                    )))
                    .map_err(failed(spec))?;

                let text = if v.is_nan() {
                    "NaN".to_string()
                } else {
                    format!("{v:.2}")
                };
                let ink = if v.abs() > 0.6 { WHITE } else { BLACK };
                chart
                    .draw_series(std::iter::once(Text::new(
                        text,
                        (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                        ("sans-serif", 16).into_font().color(&ink),
                    )))
                    .map_err(failed(spec))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_numbered_and_slugged() {
        let spec = ChartSpec::heatmap("Correlation: Numeric Columns", Vec::new(), Vec::new());
        assert_eq!(
            ChartRenderer::file_name("10_multivariate", 0, &spec),
            "10_multivariate_01_correlation_numeric_columns.png"
        );
    }

    #[test]
    fn exporting_nothing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ChartRenderer::export_all(&[], dir.path(), "empty"),
            Err(RenderError::NothingToExport)
        ));
    }

    #[test]
    fn category_labels_only_on_integer_ticks() {
        let labels = vec!["No".to_string(), "Yes".to_string()];
        assert_eq!(ChartRenderer::category_label(&labels, 1.0), "Yes");
        assert_eq!(ChartRenderer::category_label(&labels, 0.5), "");
        assert_eq!(ChartRenderer::category_label(&labels, 2.0), "");
    }
}
