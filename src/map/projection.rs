//! Web Mercator Projection
//! Maps lon/lat to a unit square and drives the map viewport (center + zoom).

use egui::{Pos2, Rect, Vec2};

/// Latitude limit of the Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// World width in pixels at zoom 0.
const TILE_SIZE: f64 = 512.0;

pub const MIN_ZOOM: f32 = 2.0;
pub const MAX_ZOOM: f32 = 12.0;

/// Project lon/lat degrees into the unit square (0,0 = north-west).
pub fn lonlat_to_unit(lon: f64, lat: f64) -> [f64; 2] {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = (lon + 180.0) / 360.0;
    let phi = lat.to_radians();
    let y = (1.0 - ((std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln()) / std::f64::consts::PI)
        / 2.0;
    [x, y]
}

/// Inverse of [`lonlat_to_unit`].
pub fn unit_to_lonlat(unit: [f64; 2]) -> (f64, f64) {
    let lon = unit[0] * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * unit[1]);
    let lat = (n.sinh()).atan().to_degrees();
    (lon, lat)
}

/// Map viewport: a center coordinate and a zoom level. The world is
/// `512 * 2^zoom` pixels wide.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Center in unit-square coordinates.
    center: [f64; 2],
    zoom: f32,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f32) -> Self {
        Self {
            center: lonlat_to_unit(center_lon, center_lat),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// World width in screen pixels at the current zoom.
    pub fn world_px(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom as f64)
    }

    /// Screen position of a unit-square coordinate within `rect`.
    pub fn unit_to_screen(&self, unit: [f64; 2], rect: Rect) -> Pos2 {
        let world = self.world_px();
        let center = rect.center();
        Pos2::new(
            center.x + ((unit[0] - self.center[0]) * world) as f32,
            center.y + ((unit[1] - self.center[1]) * world) as f32,
        )
    }

    /// Unit-square coordinate under a screen position within `rect`.
    pub fn screen_to_unit(&self, pos: Pos2, rect: Rect) -> [f64; 2] {
        let world = self.world_px();
        let center = rect.center();
        [
            self.center[0] + (pos.x - center.x) as f64 / world,
            self.center[1] + (pos.y - center.y) as f64 / world,
        ]
    }

    /// Geographic coordinate under a screen position within `rect`.
    pub fn screen_to_lonlat(&self, pos: Pos2, rect: Rect) -> (f64, f64) {
        unit_to_lonlat(self.screen_to_unit(pos, rect))
    }

    /// Shift the view so the content follows a pointer drag.
    pub fn pan_pixels(&mut self, delta: Vec2) {
        let world = self.world_px();
        self.center[0] -= delta.x as f64 / world;
        self.center[1] -= delta.y as f64 / world;
        // Wrap longitude, clamp latitude to the projection's valid band.
        self.center[0] = self.center[0].rem_euclid(1.0);
        self.center[1] = self.center[1].clamp(0.0, 1.0);
    }

    /// Adjust zoom by an additive step, clamped to the valid range.
    pub fn zoom_by(&mut self, delta: f32) {
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_island_maps_to_unit_center() {
        let unit = lonlat_to_unit(0.0, 0.0);
        assert!((unit[0] - 0.5).abs() < 1e-12);
        assert!((unit[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn projection_round_trips() {
        for &(lon, lat) in &[(-98.5795, 39.8283), (-122.42, 37.77), (151.2, -33.87)] {
            let (lon2, lat2) = unit_to_lonlat(lonlat_to_unit(lon, lat));
            assert!((lon - lon2).abs() < 1e-9, "lon {lon} -> {lon2}");
            assert!((lat - lat2).abs() < 1e-9, "lat {lat} -> {lat2}");
        }
    }

    #[test]
    fn latitude_is_clamped_to_mercator_band() {
        let unit = lonlat_to_unit(0.0, 89.0);
        assert!((unit[1] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn screen_mapping_round_trips() {
        let viewport = Viewport::new(-98.5795, 39.8283, 3.4);
        let rect = Rect::from_min_size(Pos2::ZERO, egui::vec2(800.0, 600.0));

        let unit = lonlat_to_unit(-90.0, 35.0);
        let screen = viewport.unit_to_screen(unit, rect);
        let back = viewport.screen_to_unit(screen, rect);

        assert!((unit[0] - back[0]).abs() < 1e-6);
        assert!((unit[1] - back[1]).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = Viewport::new(0.0, 0.0, 3.0);
        viewport.zoom_by(100.0);
        assert_eq!(viewport.zoom(), MAX_ZOOM);
        viewport.zoom_by(-100.0);
        assert_eq!(viewport.zoom(), MIN_ZOOM);
    }
}
