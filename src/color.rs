use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Blue sequential scale
// ---------------------------------------------------------------------------

const BLUE_HUE: f32 = 210.0;

/// Colour for `t` in `0..=1` on a light-to-dark blue ramp.
pub fn blues(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let lightness = 0.85 - 0.55 * t;
    let saturation = 0.55 + 0.25 * t;
    let rgb: Srgb = Hsl::new(BLUE_HUE, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Main series colour for line and radar charts.
pub fn accent() -> Color32 {
    blues(0.8)
}

// ---------------------------------------------------------------------------
// Value → colour mapping over an observed interval
// ---------------------------------------------------------------------------

/// Maps values of a series onto [`blues`], darkest for the largest value.
#[derive(Debug, Clone, Copy)]
pub struct ScoreGradient {
    min: f64,
    max: f64,
}

impl ScoreGradient {
    /// Build the gradient from the values that will be coloured.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Self { min, max }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: f64) -> Color32 {
        let span = self.max - self.min;
        if !span.is_finite() || span.abs() < f64::EPSILON {
            return blues(1.0);
        }
        blues((value - self.min) / span)
    }
}
