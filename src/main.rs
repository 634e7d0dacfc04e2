//! Churn Dashboard - Telecom customer churn analysis & baseline model viewer

use anyhow::Context;
use churn_dashboard::config::{AppConfig, CONFIG_FILE_NAME};
use churn_dashboard::gui::{ChurnDashboardApp, APP_TITLE};
use eframe::egui;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("churn_dashboard=info")),
        )
        .init();

    let config = AppConfig::load_or_default(Path::new(CONFIG_FILE_NAME))
        .context("failed to load dashboard configuration")?;
    tracing::info!(
        raw = %config.raw_data_path.display(),
        clean = %config.clean_data_path.display(),
        "starting dashboard"
    );

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title(APP_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|cc| Ok(Box::new(ChurnDashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
