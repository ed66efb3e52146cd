use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_color32(hue, 0.75, 0.55)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging scale for correlations
// ---------------------------------------------------------------------------

const COLD_HUE: f32 = 225.0;
const WARM_HUE: f32 = 5.0;

/// Map a correlation in [-1, 1] to a cool-to-warm colour; 0 is near white,
/// NaN is grey.
pub fn diverging(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::from_gray(110);
    }
    let v = value.clamp(-1.0, 1.0) as f32;
    let strength = v.abs();
    let hue = if v < 0.0 { COLD_HUE } else { WARM_HUE };
    hsl_to_color32(hue, 0.15 + 0.6 * strength, 0.92 - 0.47 * strength)
}

/// Readable annotation colour on top of [`diverging`]`(value)`.
pub fn diverging_text(value: f64) -> Color32 {
    if value.is_nan() || value.abs() > 0.6 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_distinct() {
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_diverging_ends() {
        let cold = diverging(-1.0);
        let warm = diverging(1.0);
        assert!(cold.b() > cold.r());
        assert!(warm.r() > warm.b());
        // Near-zero correlations are pale.
        let neutral = diverging(0.0);
        assert!(neutral.r() > 200 && neutral.g() > 200 && neutral.b() > 200);
        assert_eq!(diverging(f64::NAN), Color32::from_gray(110));
        assert_eq!(diverging_text(0.9), Color32::WHITE);
        assert_eq!(diverging_text(0.1), Color32::BLACK);
    }
}
