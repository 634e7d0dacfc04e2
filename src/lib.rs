//! Churn Dashboard - Telecom customer churn analysis & baseline models
//!
//! Seventeen report sections over the Telco customer dataset: overview,
//! cleaning, exploratory charts, a stratified split and two baseline
//! classifiers. The `gui` module hosts them in an egui window.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod model;
pub mod report;
pub mod stats;
