use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::KNOWN_EFFECTS;

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Color mapping: reliance effect → Color32
// ---------------------------------------------------------------------------

/// Fixed colours for `Increase` and `Decrease`, in [`KNOWN_EFFECTS`] order.
const KNOWN_EFFECT_COLORS: [Color32; 2] = [
    Color32::from_rgb(0x63, 0x6e, 0xfa),
    Color32::from_rgb(0xef, 0x55, 0x3b),
];

/// Maps effect labels to distinct colours. `Increase` and `Decrease` have
/// fixed colours; any other label gets a generated hue.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn for_effects<'a>(extra: impl IntoIterator<Item = &'a str>) -> Self {
        let mut mapping: BTreeMap<String, Color32> = KNOWN_EFFECTS
            .iter()
            .zip(KNOWN_EFFECT_COLORS)
            .map(|(label, color)| (label.to_string(), color))
            .collect();

        let mut others: Vec<&str> = Vec::new();
        for label in extra {
            if !KNOWN_EFFECTS.contains(&label) && !others.contains(&label) {
                others.push(label);
            }
        }
        let palette = generate_palette(others.len());
        mapping.extend(
            others
                .into_iter()
                .zip(palette)
                .map(|(label, color)| (label.to_string(), color)),
        );

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given effect label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::for_effects([])
    }
}

// ---------------------------------------------------------------------------
// Continuous scale for the heatmap
// ---------------------------------------------------------------------------

/// Viridis control points, sRGB.
const VIRIDIS: [(f32, f32, f32); 5] = [
    (0.267, 0.005, 0.329),
    (0.231, 0.322, 0.545),
    (0.129, 0.569, 0.549),
    (0.369, 0.788, 0.384),
    (0.993, 0.906, 0.144),
];

/// Sample the viridis scale at `t` in `[0, 1]` (clamped).
pub fn viridis(t: f32) -> Color32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS.len() - 1) as f32;
    let lo = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - lo as f32;

    let stop = |(r, g, b): (f32, f32, f32)| -> LinSrgb { Srgb::new(r, g, b).into_linear() };
    let mixed = stop(VIRIDIS[lo]).mix(stop(VIRIDIS[lo + 1]), frac);
    to_color32(Srgb::from_linear(mixed))
}

/// Black or white, whichever reads better on `background`.
pub fn contrast_text(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
