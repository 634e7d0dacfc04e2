//! Churn Dashboard Main Application
//! Main window with the navigation panel and the section view.

use crate::charts::ChartRenderer;
use crate::config::AppConfig;
use crate::gui::{EvalResult, NavigationAction, NavigationPanel, SectionView, SectionWorker};
use crate::report::Section;
use egui::{RichText, SidePanel};

pub const APP_TITLE: &str = "Customer Churn Prediction for Telecom";

/// Main application window.
pub struct ChurnDashboardApp {
    navigation: NavigationPanel,
    view: SectionView,

    // Async section evaluation
    worker: SectionWorker,
    pending: Option<Section>,
}

impl ChurnDashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self {
            navigation: NavigationPanel::new(),
            view: SectionView::default(),
            worker: SectionWorker::spawn(config),
            pending: None,
        };
        app.start_evaluation(app.navigation.selected);
        app
    }

    /// Queue the section on the worker thread.
    ///
    /// Only the most recent request is shown; results of older ones are dropped.
    fn start_evaluation(&mut self, section: Section) {
        self.view = SectionView::Loading(section.heading());
        self.navigation.export_enabled = false;

        if self.worker.submit(section) {
            self.pending = Some(section);
            self.navigation.set_status(format!("Running {}...", section.label()));
        } else {
            self.pending = None;
            self.navigation.set_status("Error: section worker stopped");
            self.view = SectionView::Failed {
                heading: section.heading(),
                message: "The background worker is no longer running.".to_string(),
            };
        }
    }

    /// Check for evaluation results
    fn check_evaluation_results(&mut self) {
        while let Some((section, result)) = self.worker.try_recv() {
            if self.pending != Some(section) {
                tracing::debug!(section = section.label(), "dropping superseded result");
                continue;
            }
            self.pending = None;

            match result {
                EvalResult::Complete(report) => {
                    let charts = report.charts().len();
                    self.navigation.export_enabled = charts > 0;
                    self.navigation.set_status(if charts > 0 {
                        format!("Complete! {charts} charts ready")
                    } else {
                        "Complete!".to_string()
                    });
                    self.view = SectionView::Report(report);
                }
                EvalResult::Error(error) => {
                    self.navigation.set_status(format!("Error: {error}"));
                    self.view = SectionView::Failed {
                        heading: section.heading(),
                        message: error,
                    };
                }
            }
        }
    }

    /// Write the charts of the current section as PNG files into a chosen folder
    fn handle_export_charts(&mut self) {
        let Some(report) = self.view.report() else {
            self.navigation.set_status("No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        let prefix = report.section.slug();
        match ChartRenderer::export_all(&report.charts(), &dir, &prefix) {
            Ok(paths) => {
                self.navigation
                    .set_status(format!("Exported {} charts to {}", paths.len(), dir.display()));
                if let Err(e) = open::that(&dir) {
                    tracing::warn!(dir = %dir.display(), error = %e, "could not open export folder");
                }
            }
            Err(e) => {
                self.navigation.set_status(format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for ChurnDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_evaluation_results();

        // Request repaint while evaluating
        if self.pending.is_some() {
            ctx.request_repaint();
        }

        // Left panel - Navigation
        SidePanel::left("navigation_panel")
            .min_width(240.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.navigation.show(ui) {
                        NavigationAction::SectionChanged(section) => {
                            self.start_evaluation(section)
                        }
                        NavigationAction::ExportCharts => self.handle_export_charts(),
                        NavigationAction::None => {}
                    }
                });
            });

        // Central panel - Section report
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(RichText::new(APP_TITLE).size(26.0).strong());
            ui.separator();
            self.view.show(ui);
        });
    }
}
