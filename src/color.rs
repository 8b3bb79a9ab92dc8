use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Golden-angle hue step; consecutive categories land far apart on the wheel.
const HUE_STEP: f32 = 137.508;

/// `n` distinct chart colours. Hues advance by the golden angle from a blue
/// start and lightness alternates so neighbouring bars stay distinguishable.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (215.0 + i as f32 * HUE_STEP) % 360.0;
            let lightness = if i % 2 == 0 { 0.52 } else { 0.62 };
            let rgb: Srgb = Hsl::new(hue, 0.6, lightness).into_color();
            let [r, g, b] = [rgb.red, rgb.green, rgb.blue]
                .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
            Color32::from_rgb(r, g, b)
        })
        .collect()
}

/// Maps the categories of one chart to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map over the given categories, in iteration order.
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a String>) -> Self {
        let categories: Vec<&String> = categories.into_iter().collect();
        let palette = generate_palette(categories.len());
        let mapping = categories
            .into_iter()
            .zip(palette)
            .map(|(c, color)| (c.clone(), color))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category.
    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping
            .get(category)
            .copied()
            .unwrap_or(self.default_color)
    }
}
