//! Choropleth Paint Rules
//! Five-anchor blue ramp over the centile score and the binary fill-opacity rule.

use egui::Color32;

/// Ramp anchors: (score, color), lightest to darkest blue.
pub const SCORE_STOPS: [(f64, Color32); 5] = [
    (0.0, Color32::from_rgb(0xf7, 0xfb, 0xff)),
    (25.0, Color32::from_rgb(0xc6, 0xdb, 0xef)),
    (50.0, Color32::from_rgb(0x6b, 0xae, 0xd6)),
    (75.0, Color32::from_rgb(0x21, 0x71, 0xb5)),
    (100.0, Color32::from_rgb(0x08, 0x30, 0x6b)),
];

/// Fill opacity for features carrying a centile score.
pub const SCORED_FILL_OPACITY: f32 = 0.7;

/// Fill color for a centile score: piecewise-linear interpolation between
/// the anchor stops, clamped at the ends.
pub fn score_fill_color(score: f64) -> Color32 {
    let (first, last) = (SCORE_STOPS[0], SCORE_STOPS[SCORE_STOPS.len() - 1]);
    if score <= first.0 {
        return first.1;
    }
    if score >= last.0 {
        return last.1;
    }

    for window in SCORE_STOPS.windows(2) {
        let (s0, c0) = window[0];
        let (s1, c1) = window[1];
        if score <= s1 {
            let t = ((score - s0) / (s1 - s0)) as f32;
            return lerp_color(c0, c1, t);
        }
    }
    last.1
}

/// Fill opacity rule: scored features are drawn at 0.7, unscored features
/// are invisible rather than defaulting to a visible color.
pub fn fill_opacity(score: Option<f64>) -> f32 {
    if score.is_some() {
        SCORED_FILL_OPACITY
    } else {
        0.0
    }
}

/// Fill color with the opacity rule applied.
pub fn fill_for(score: Option<f64>) -> Option<Color32> {
    let score = score?;
    let color = score_fill_color(score);
    let alpha = (SCORED_FILL_OPACITY * 255.0).round() as u8;
    Some(Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        alpha,
    ))
}

fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let mix = |x: u8, y: u8| (x as f32 + t * (y as f32 - x as f32)).round() as u8;
    Color32::from_rgb(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_hit_exactly() {
        assert_eq!(score_fill_color(0.0), SCORE_STOPS[0].1);
        assert_eq!(score_fill_color(25.0), SCORE_STOPS[1].1);
        assert_eq!(score_fill_color(50.0), SCORE_STOPS[2].1);
        assert_eq!(score_fill_color(75.0), SCORE_STOPS[3].1);
        assert_eq!(score_fill_color(100.0), SCORE_STOPS[4].1);
    }

    #[test]
    fn ends_are_clamped() {
        assert_eq!(score_fill_color(-10.0), SCORE_STOPS[0].1);
        assert_eq!(score_fill_color(250.0), SCORE_STOPS[4].1);
    }

    #[test]
    fn interpolation_between_stops_is_linear() {
        // Halfway between the 0 and 25 stops.
        let mid = score_fill_color(12.5);
        let (a, b) = (SCORE_STOPS[0].1, SCORE_STOPS[1].1);
        assert_eq!(mid.r(), ((a.r() as u16 + b.r() as u16 + 1) / 2) as u8);
    }

    #[test]
    fn opacity_is_binary_on_score_presence() {
        assert_eq!(fill_opacity(Some(62.3)), 0.7);
        assert_eq!(fill_opacity(None), 0.0);
    }

    #[test]
    fn unscored_features_get_no_fill() {
        assert!(fill_for(None).is_none());
        let fill = fill_for(Some(100.0)).unwrap();
        assert_eq!(fill.a(), (0.7f32 * 255.0).round() as u8);
    }
}
