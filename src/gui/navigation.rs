//! Navigation Panel Widget
//! Left side panel with the section radio list and chart export.

use crate::report::Section;
use egui::{Color32, RichText};

/// Left side panel holding the selected section and the status line.
pub struct NavigationPanel {
    pub selected: Section,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for NavigationPanel {
    fn default() -> Self {
        Self {
            selected: Section::default(),
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl NavigationPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> NavigationAction {
        let mut action = NavigationAction::None;

        ui.add_space(5.0);
        ui.label(RichText::new("Navigation").size(20.0).strong());
        ui.add_space(8.0);
        ui.separator();
        ui.add_space(5.0);

        ui.label(RichText::new("Go to").size(14.0).strong());
        ui.add_space(5.0);

        for section in Section::ALL {
            if ui
                .radio_value(&mut self.selected, section, section.label())
                .changed()
            {
                action = NavigationAction::SectionChanged(section);
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export charts").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = NavigationAction::ExportCharts;
                }
            });
        });

        ui.add_space(10.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

/// Actions triggered by the navigation panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationAction {
    None,
    SectionChanged(Section),
    ExportCharts,
}
