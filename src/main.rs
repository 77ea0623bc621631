//! CentileMap - US ZIP Code Centile Choropleth Viewer
//!
//! Shades ZIP-code boundary polygons by a precomputed centile score and shows
//! demographic detail on hover.

mod config;
mod data;
mod gui;
mod map;

use anyhow::anyhow;
use config::AppConfig;
use eframe::egui;
use gui::CentileMapApp;
use std::path::Path;

const CONFIG_PATH: &str = "centilemap.toml";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load_or_default(Path::new(CONFIG_PATH))?;

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1000.0, 640.0])
            .with_title("CentileMap"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "CentileMap",
        options,
        Box::new(move |cc| Ok(Box::new(CentileMapApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("failed to run the app: {e}"))
}
