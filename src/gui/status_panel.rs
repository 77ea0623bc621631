//! Status Panel Widget
//! Left side panel: title, loading state, error banners, record count and the
//! score legend.

use crate::map::color::SCORE_STOPS;
use egui::{Color32, RichText};

const ERROR_RED: Color32 = Color32::from_rgb(220, 53, 69);
const OK_GREEN: Color32 = Color32::from_rgb(40, 167, 69);

/// Left side panel state. The app updates these fields from its event
/// handlers; the panel only renders them.
pub struct StatusPanel {
    pub status: String,
    pub loading: bool,
    pub score_error: Option<String>,
    pub boundary_error: Option<String>,
    pub loaded_count: Option<usize>,
}

impl Default for StatusPanel {
    fn default() -> Self {
        Self {
            status: "Starting...".to_string(),
            loading: true,
            score_error: None,
            boundary_error: None,
            loaded_count: None,
        }
    }
}

impl StatusPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the panel.
    pub fn show(&self, ui: &mut egui::Ui) {
        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🗺 CentileMap")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("US ZIP Code Centile Scores")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Status Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        if self.loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(&self.status).size(12.0).color(Color32::GRAY));
            });
        } else {
            ui.label(RichText::new(&self.status).size(12.0).color(Color32::GRAY));
        }

        if let Some(count) = self.loaded_count {
            ui.add_space(5.0);
            ui.label(
                RichText::new(format!("Loaded {} ZIP codes", count))
                    .size(13.0)
                    .color(OK_GREEN),
            );
        }

        for error in [&self.score_error, &self.boundary_error].into_iter().flatten() {
            ui.add_space(8.0);
            error_banner(ui, error);
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Legend Section =====
        ui.label(RichText::new("🎨 Centile Score").size(14.0).strong());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            for (score, color) in SCORE_STOPS {
                ui.vertical(|ui| {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(30.0, 16.0), egui::Sense::hover());
                    ui.painter().rect_filled(rect, 3.0, color);
                    ui.label(RichText::new(format!("{}", score as u32)).size(11.0));
                });
            }
        });

        ui.add_space(8.0);
        ui.label(
            RichText::new("Hover a ZIP code for demographic detail.")
                .size(11.0)
                .color(Color32::GRAY),
        );
    }
}

fn error_banner(ui: &mut egui::Ui, message: &str) {
    egui::Frame::none()
        .fill(Color32::from_rgb(60, 20, 24))
        .stroke(egui::Stroke::new(1.0, ERROR_RED))
        .rounding(5.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(message).size(12.0).color(ERROR_RED));
        });
}
