//! Application Configuration
//! TOML-backed settings for input paths, spreadsheet layout and the initial viewport.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level application configuration.
///
/// Loaded once before the window is created and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Path to the xlsx workbook holding the centile scores.
    pub scores_path: PathBuf,
    /// Path to the ZIP-code boundary GeoJSON (TIGER/ZCTA derived).
    pub boundaries_path: PathBuf,
    pub layout: SheetLayout,
    pub viewport: ViewportConfig,
    /// Douglas-Peucker tolerance (degrees) applied to boundary polygons.
    /// The upstream pipeline pre-simplifies with 0.001; keeping the same
    /// default makes an unsimplified file paintable too.
    pub simplify_tolerance: f64,
}

/// Fixed layout of the source workbook.
///
/// The header row offset is a property of the specific input file, so it is
/// configuration rather than a constant buried in the parser.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// Zero-indexed row holding the column headers.
    pub header_row: usize,
    pub zip_col: usize,
    pub score_col: usize,
    pub city_col: usize,
    pub state_col: usize,
    pub population_col: usize,
    /// Bachelor's degree share, stored as a fraction (0..1) in the source.
    pub bachelors_col: usize,
    /// Median income in thousands of dollars.
    pub income_col: usize,
}

/// Initial map viewport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// [longitude, latitude] of the initial center.
    pub center: [f64; 2],
    pub zoom: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scores_path: PathBuf::from("data/zip_scores.xlsx"),
            boundaries_path: PathBuf::from("data/zip_codes.geojson"),
            layout: SheetLayout::default(),
            viewport: ViewportConfig::default(),
            simplify_tolerance: 0.001,
        }
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row: 6,
            zip_col: 0,
            score_col: 1,
            city_col: 4,
            state_col: 5,
            population_col: 6,
            bachelors_col: 8,
            income_col: 9,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        // Center of the continental US, zoomed out far enough to show it whole.
        Self {
            center: [-98.5795, 39.8283],
            zoom: 3.4,
        }
    }
}

impl AppConfig {
    /// Load the configuration file, falling back to defaults when it does
    /// not exist. A file that exists but fails to parse is a startup error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(?path, "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config file: {:?}", path))
            }
        };

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_workbook_layout() {
        let layout = SheetLayout::default();
        assert_eq!(layout.header_row, 6);
        assert_eq!(layout.zip_col, 0);
        assert_eq!(layout.score_col, 1);
        assert_eq!(layout.income_col, 9);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            scores_path = "other/scores.xlsx"

            [layout]
            header_row = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.scores_path, PathBuf::from("other/scores.xlsx"));
        assert_eq!(config.layout.header_row, 2);
        // Unspecified fields keep their defaults.
        assert_eq!(config.layout.score_col, 1);
        assert_eq!(config.viewport.center, [-98.5795, 39.8283]);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_or_default(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config.boundaries_path, PathBuf::from("data/zip_codes.geojson"));
    }
}
