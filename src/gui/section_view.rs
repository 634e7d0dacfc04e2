//! Section View Widget
//! Central scrollable panel rendering the blocks of one section report.

use crate::charts::ChartPlotter;
use crate::report::{Block, DataTable, SectionReport};
use egui::{Color32, RichText, ScrollArea};

const BLOCK_SPACING: f32 = 10.0;
const CHART_WIDTH: f32 = 780.0;
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(40, 167, 69);

/// What the central panel currently shows.
#[derive(Default)]
pub enum SectionView {
    #[default]
    Empty,
    Loading(String),
    Report(SectionReport),
    Failed { heading: String, message: String },
}

impl SectionView {
    pub fn report(&self) -> Option<&SectionReport> {
        match self {
            SectionView::Report(report) => Some(report),
            _ => None,
        }
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        match self {
            SectionView::Empty => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0));
                });
            }
            SectionView::Loading(heading) => {
                ui.heading(heading);
                ui.add_space(BLOCK_SPACING);
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Running...");
                });
            }
            SectionView::Failed { heading, message } => {
                ui.heading(heading);
                ui.add_space(BLOCK_SPACING);
                ui.label(RichText::new(format!("Error: {message}")).color(ERROR_COLOR));
            }
            SectionView::Report(report) => Self::show_report(ui, report),
        }
    }

    fn show_report(ui: &mut egui::Ui, report: &SectionReport) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(&report.heading);
                ui.add_space(BLOCK_SPACING);

                let mut chart_index = 0;
                for (index, block) in report.blocks.iter().enumerate() {
                    match block {
                        Block::Subheader(text) => {
                            ui.add_space(BLOCK_SPACING);
                            ui.label(RichText::new(text).size(17.0).strong());
                        }
                        Block::Text(text) => {
                            ui.label(text);
                        }
                        Block::Markdown(text) => Self::draw_markdown(ui, text),
                        Block::Code { source, .. } => {
                            egui::Frame::none()
                                .fill(ui.visuals().extreme_bg_color)
                                .rounding(5.0)
                                .inner_margin(8.0)
                                .show(ui, |ui| {
                                    ui.label(RichText::new(source).monospace());
                                });
                        }
                        Block::Success(text) => {
                            ui.label(RichText::new(text).color(SUCCESS_COLOR));
                        }
                        Block::Table(table) => Self::draw_table(ui, table, index),
                        Block::Preformatted(text) => {
                            ui.label(RichText::new(text).monospace());
                        }
                        Block::Chart(spec) => {
                            let id = format!("{}_{chart_index}", report.section.slug());
                            chart_index += 1;
                            egui::Frame::none()
                                .rounding(8.0)
                                .stroke(egui::Stroke::new(1.0, Color32::from_gray(90)))
                                .inner_margin(12.0)
                                .show(ui, |ui| {
                                    ui.set_width(CHART_WIDTH.min(ui.available_width()));
                                    ChartPlotter::draw(ui, spec, &id);
                                });
                        }
                    }
                    ui.add_space(BLOCK_SPACING / 2.0);
                }
            });
    }

    /// Bullets (`- `) and bold lines (`**text**`); anything else is plain.
    fn draw_markdown(ui: &mut egui::Ui, text: &str) {
        for line in text.lines() {
            if let Some(item) = line.strip_prefix("- ") {
                ui.label(format!("• {item}"));
            } else if let Some(bold) = line
                .strip_prefix("**")
                .and_then(|rest| rest.strip_suffix("**"))
            {
                ui.add_space(4.0);
                ui.label(RichText::new(bold).strong());
            } else if line.trim().is_empty() {
                ui.add_space(6.0);
            } else {
                ui.label(line);
            }
        }
    }

    fn draw_table(ui: &mut egui::Ui, table: &DataTable, index: usize) {
        ScrollArea::horizontal()
            .id_salt(("table_scroll", index))
            .show(ui, |ui| {
                egui::Grid::new(("table", index))
                    .striped(true)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        for header in &table.headers {
                            ui.label(RichText::new(header).strong());
                        }
                        ui.end_row();
                        for row in &table.rows {
                            for cell in row {
                                ui.label(cell);
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
