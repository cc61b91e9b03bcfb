use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::filter::{FAILURE_LABEL, SUCCESS_LABEL};

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
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

pub const SUCCESS_COLOR: Color32 = Color32::from_rgb(76, 175, 80);
pub const FAILURE_COLOR: Color32 = Color32::from_rgb(229, 57, 53);

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of one categorical column to distinct colours.
///
/// Built once from the whole dataset, so a category keeps its colour no
/// matter which filters are active.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(categories: &BTreeSet<String>) -> Self {
        let palette = generate_palette(categories.len());
        let mapping = categories.iter().cloned().zip(palette).collect();

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

    /// Colour of a proportion-chart slice: fixed green/red for the outcome
    /// breakdown, the category colour otherwise.
    pub fn slice_color(&self, label: &str) -> Color32 {
        match label {
            SUCCESS_LABEL => SUCCESS_COLOR,
            FAILURE_LABEL => FAILURE_COLOR,
            other => self.color_for(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_distinct() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        let unique: BTreeSet<_> = p.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 4);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_category_falls_back_to_gray() {
        let cats: BTreeSet<String> = ["B4", "FT"].map(String::from).into();
        let map = ColorMap::new(&cats);
        assert_ne!(map.color_for("FT"), Color32::GRAY);
        assert_eq!(map.color_for("v1.0"), Color32::GRAY);
        assert_eq!(map.slice_color("Success"), SUCCESS_COLOR);
        assert_eq!(map.slice_color("Failure"), FAILURE_COLOR);
    }
}
