//! GUI module - User interface components

mod app;
mod navigation;
mod section_view;
mod worker;

pub use app::{ChurnDashboardApp, APP_TITLE};
pub use navigation::{NavigationAction, NavigationPanel};
pub use section_view::SectionView;
pub use worker::{EvalResult, SectionWorker};
