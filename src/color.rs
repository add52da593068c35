use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: categorical value → Color32
// ---------------------------------------------------------------------------

/// Stable colour assignment for a categorical dimension's distinct values.
#[derive(Debug, Clone)]
pub struct ValueColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ValueColors {
    /// Assign one hue per value, in sorted value order.
    pub fn new(values: &BTreeSet<String>) -> Self {
        let palette = generate_palette(values.len());
        let mapping: BTreeMap<String, Color32> =
            values.iter().cloned().zip(palette).collect();

        ValueColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a value.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}
