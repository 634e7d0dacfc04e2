//! Chart Plotter Module
//! Draws chart specs interactively with egui_plot.

use super::{coolwarm, palette_color, ChartKind, ChartSpec, DENSITY_COLOR};
use crate::stats::{BoxStats, HistogramBin};
use egui::{Color32, RichText};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points,
};

const CHART_HEIGHT: f32 = 320.0;
const HEATMAP_CELL: [f32; 2] = [78.0, 26.0];

fn rgb((r, g, b): (u8, u8, u8)) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Creates interactive charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw one chart; `id` keeps plot state apart when titles repeat.
    pub fn draw(ui: &mut egui::Ui, spec: &ChartSpec, id: &str) {
        ui.label(RichText::new(&spec.title).size(14.0).strong());
        match &spec.kind {
            ChartKind::Bar { categories, series } => {
                Self::draw_bar_chart(ui, spec, id, categories, series)
            }
            ChartKind::Histogram { bins, kde } => Self::draw_histogram(ui, spec, id, bins, kde),
            ChartKind::BoxPlot { groups } => Self::draw_box_plot(ui, spec, id, groups),
            ChartKind::Heatmap { labels, values } => Self::draw_heatmap(ui, id, labels, values),
        }
    }

    fn category_formatter(
        labels: Vec<String>,
    ) -> impl Fn(egui_plot::GridMark, &std::ops::RangeInclusive<f64>) -> String {
        move |mark, _range| {
            let rounded = mark.value.round();
            if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
                return String::new();
            }
            labels.get(rounded as usize).cloned().unwrap_or_default()
        }
    }

    /// Grouped bars: series `s` of `k` sits at `category + offset(s)`.
    fn draw_bar_chart(
        ui: &mut egui::Ui,
        spec: &ChartSpec,
        id: &str,
        categories: &[String],
        series: &[super::Series],
    ) {
        let k = series.len().max(1) as f64;
        let width = 0.8 / k;

        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .include_y(0.0)
            .legend(Legend::default())
            .x_axis_formatter(Self::category_formatter(categories.to_vec()))
            .show(ui, |plot_ui| {
                for (s, entry) in series.iter().enumerate() {
                    let offset = -0.4 + width * (s as f64 + 0.5);
                    let color = rgb(palette_color(s));
                    let bars: Vec<Bar> = entry
                        .values
                        .iter()
                        .enumerate()
                        .map(|(c, &v)| {
                            Bar::new(c as f64 + offset, v)
                                .width(width * 0.95)
                                .name(categories.get(c).cloned().unwrap_or_default())
                        })
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).color(color).name(&entry.name));
                }
            });
    }

    fn draw_histogram(
        ui: &mut egui::Ui,
        spec: &ChartSpec,
        id: &str,
        bins: &[HistogramBin],
        kde: &[[f64; 2]],
    ) {
        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .include_y(0.0)
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = bins
                    .iter()
                    .map(|b| {
                        Bar::new((b.start + b.end) / 2.0, b.count as f64).width(b.end - b.start)
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(rgb(palette_color(0)).gamma_multiply(0.7))
                        .name("count"),
                );

                if !kde.is_empty() {
                    plot_ui.line(
                        Line::new(PlotPoints::from(kde.to_vec()))
                            .color(rgb(DENSITY_COLOR))
                            .width(2.0)
                            .name("density"),
                    );
                }
            });
    }

    fn draw_box_plot(ui: &mut egui::Ui, spec: &ChartSpec, id: &str, groups: &[(String, BoxStats)]) {
        let labels: Vec<String> = groups.iter().map(|(g, _)| g.clone()).collect();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .include_y(0.0)
            .include_y(spec.y_max())
            .x_axis_formatter(Self::category_formatter(labels))
            .show(ui, |plot_ui| {
                for (i, (group, stats)) in groups.iter().enumerate() {
                    let color = rgb(palette_color(i));
                    let x = i as f64;

                    let box_elem = BoxElem::new(
                        x,
                        BoxSpread::new(
                            stats.whisker_low,
                            stats.q1,
                            stats.median,
                            stats.q3,
                            stats.whisker_high,
                        ),
                    )
                    .box_width(0.5)
                    .fill(color.gamma_multiply(0.3))
                    .stroke(egui::Stroke::new(1.5, color));
                    plot_ui.box_plot(BoxPlot::new(vec![box_elem]).name(group));

                    if !stats.outliers.is_empty() {
                        let points: PlotPoints = stats.outliers.iter().map(|&y| [x, y]).collect();
                        plot_ui.points(
                            Points::new(points)
                                .radius(2.5)
                                .color(color.gamma_multiply(0.7))
                                .name(format!("{} outliers", group)),
                        );
                    }
                }
            });
    }

    /// Heatmaps are a grid of colored cells annotated with their values.
    fn draw_heatmap(ui: &mut egui::Ui, id: &str, labels: &[String], values: &[Vec<f64>]) {
        egui::Grid::new(ui.make_persistent_id(format!("heatmap_{id}")))
            .spacing([2.0, 2.0])
            .show(ui, |ui| {
                ui.label("");
                for label in labels {
                    ui.label(RichText::new(label).size(11.0).strong());
                }
                ui.end_row();

                for (label, row) in labels.iter().zip(values.iter()) {
                    ui.label(RichText::new(label).size(11.0).strong());
                    for &v in row {
                        let (r, g, b) = coolwarm(v);
                        let text_color = if v.abs() > 0.6 {
                            Color32::WHITE
                        } else {
                            Color32::BLACK
                        };
                        egui::Frame::none()
                            .fill(Color32::from_rgb(r, g, b))
                            .inner_margin(4.0)
                            .show(ui, |ui| {
                                ui.set_min_size(egui::vec2(HEATMAP_CELL[0], HEATMAP_CELL[1]));
                                let text = if v.is_nan() {
                                    "NaN".to_string()
                                } else {
                                    format!("{v:.2}")
                                };
                                ui.label(RichText::new(text).size(12.0).color(text_color));
                            });
                    }
                    ui.end_row();
                }
            });
    }
}
