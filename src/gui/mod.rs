//! GUI module - application window and panels

mod app;
mod status_panel;

pub use app::CentileMapApp;
pub use status_panel::StatusPanel;
