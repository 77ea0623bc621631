//! Map View Widget
//! Owns the viewport and the installed boundary source; paints the choropleth
//! fill, the outline layer, and the hover tooltip.

use crate::config::ViewportConfig;
use crate::map::color;
use crate::map::projection::Viewport;
use crate::map::source::{BoundarySource, ZipShape};
use crate::map::tooltip::HoverInfo;
use egui::epaint::Mesh;
use egui::{Color32, Pos2, Rect, RichText, Sense, Shape, Stroke};

const BACKGROUND: Color32 = Color32::from_rgb(24, 28, 38);
const OUTLINE: Stroke = Stroke {
    width: 1.0,
    color: Color32::WHITE,
};

/// Interactive map viewport.
///
/// Plays the rendering-engine role: consumes a named data source and paint
/// rules, reports ready after its first paint, and resolves pointer events
/// against the installed shapes.
pub struct MapView {
    viewport: Viewport,
    ready: bool,
    source: Option<(String, BoundarySource)>,
}

impl MapView {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            viewport: Viewport::new(config.center[0], config.center[1], config.zoom),
            ready: false,
            source: None,
        }
    }

    /// True once the view has painted at least one frame.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn has_source(&self, id: &str) -> bool {
        matches!(&self.source, Some((existing, _)) if existing == id)
    }

    /// Install a named data source. A source that is already installed under
    /// the same id is left alone, guarding against duplicate attachment.
    /// Returns whether the source was installed.
    pub fn set_boundary_source(&mut self, id: &str, source: BoundarySource) -> bool {
        if self.has_source(id) {
            tracing::debug!(id, "boundary source already installed, skipping");
            return false;
        }
        self.source = Some((id.to_string(), source));
        true
    }

    pub fn source(&self) -> Option<&BoundarySource> {
        self.source.as_ref().map(|(_, source)| source)
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter().with_clip_rect(rect);
        painter.rect_filled(rect, 4.0, BACKGROUND);

        // Drag to pan, scroll or pinch to zoom.
        if response.dragged() {
            self.viewport.pan_pixels(response.drag_delta());
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta).y;
            if scroll.abs() > f32::EPSILON {
                self.viewport.zoom_by((scroll / 10.0).tanh());
            }
            let pinch = ui.input(|i| i.zoom_delta());
            if (pinch - 1.0).abs() > f32::EPSILON {
                self.viewport.zoom_by(pinch.log2());
            }
        }

        if let Some((_, source)) = &self.source {
            paint_shapes(&painter, &self.viewport, rect, source);

            // Hover tooltip for scored features only.
            if let Some(pointer) = response.hover_pos() {
                if !response.dragged() {
                    let (lon, lat) = self.viewport.screen_to_lonlat(pointer, rect);
                    if let Some(info) = source
                        .hit_test(lon, lat)
                        .and_then(|shape| HoverInfo::from_properties(&shape.zip, &shape.properties))
                    {
                        show_hover_tooltip(ui, &response, &info);
                    }
                }
            }
        }

        self.ready = true;
    }

    #[cfg(test)]
    pub(crate) fn force_ready(&mut self) {
        self.ready = true;
    }
}

fn paint_shapes(painter: &egui::Painter, viewport: &Viewport, rect: Rect, source: &BoundarySource) {
    let view_min = viewport.screen_to_unit(rect.min, rect);
    let view_max = viewport.screen_to_unit(rect.max, rect);

    for shape in source.shapes() {
        let (min, max) = shape.bounds;
        if max[0] < view_min[0] || min[0] > view_max[0] || max[1] < view_min[1]
            || min[1] > view_max[1]
        {
            continue;
        }

        paint_fill(painter, viewport, rect, shape);
        paint_outline(painter, viewport, rect, shape);
    }
}

/// Fill layer: color from the score ramp, skipped entirely for unscored
/// shapes (opacity 0).
fn paint_fill(painter: &egui::Painter, viewport: &Viewport, rect: Rect, shape: &ZipShape) {
    let Some(fill) = color::fill_for(shape.centile) else {
        return;
    };

    for mesh_data in &shape.meshes {
        if mesh_data.indices.is_empty() {
            continue;
        }
        let mut mesh = Mesh::default();
        for &vertex in &mesh_data.vertices {
            mesh.colored_vertex(viewport.unit_to_screen(vertex, rect), fill);
        }
        mesh.indices.extend_from_slice(&mesh_data.indices);
        painter.add(Shape::mesh(mesh));
    }
}

/// Outline layer: constant thin white line, independent of score.
fn paint_outline(painter: &egui::Painter, viewport: &Viewport, rect: Rect, shape: &ZipShape) {
    for mesh_data in &shape.meshes {
        for ring in &mesh_data.rings {
            let points: Vec<Pos2> = ring
                .iter()
                .map(|&unit| viewport.unit_to_screen(unit, rect))
                .collect();
            if points.len() >= 2 {
                painter.add(Shape::line(points, OUTLINE));
            }
        }
    }
}

fn show_hover_tooltip(ui: &egui::Ui, response: &egui::Response, info: &HoverInfo) {
    egui::show_tooltip_at_pointer(
        ui.ctx(),
        ui.layer_id(),
        response.id.with("zip_hover"),
        |ui| {
            ui.label(RichText::new(&info.zip).strong());
            ui.label(RichText::new(&info.score).strong());
            ui.label(&info.place);
            ui.label(&info.population);
            ui.label(&info.bachelors);
            ui.label(&info.income);
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> MapView {
        MapView::new(&ViewportConfig::default())
    }

    #[test]
    fn source_install_is_idempotent() {
        let mut view = view();
        assert!(!view.has_source("zip-boundaries"));

        assert!(view.set_boundary_source("zip-boundaries", BoundarySource::build(Vec::new())));
        assert!(view.has_source("zip-boundaries"));

        // Re-attaching under the same id must be a no-op.
        assert!(!view.set_boundary_source("zip-boundaries", BoundarySource::build(Vec::new())));
    }

    #[test]
    fn view_is_not_ready_before_first_paint() {
        let view = view();
        assert!(!view.is_ready());
    }
}
