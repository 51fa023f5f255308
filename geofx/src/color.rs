//! Packed HSV + intensity colors.
//!
//! Colors are normalized by their brightest channel before conversion to
//! HSV. The brightest channel itself travels as the fourth component, so
//! overbright colors survive a uniform that expects values in `0..=1`.

use palette::{FromColor, Hsv, LinSrgb, Srgb};

/// Lower bound of the intensity component.
pub const HSVM_EPSILON: f32 = 1e-5;

/// Converts linear RGB into `[hue, saturation, value, max]`.
/// Hue is in turns, `0..1`.
pub fn hsvm(color: LinSrgb) -> [f32; 4] {
    let max = color
        .red
        .max(color.green)
        .max(color.blue)
        .max(HSVM_EPSILON);

    // Plain component math, no transfer function is applied.
    let normalized =
        Srgb::new(color.red / max, color.green / max, color.blue / max);
    let hsv: Hsv = Hsv::from_color(normalized);

    [
        hsv.hue.into_positive_degrees() / 360.0,
        hsv.saturation,
        hsv.value,
        max,
    ]
}

/// Reconstructs linear RGB from `[hue, saturation, value, max]`.
pub fn from_hsvm(hsvm: [f32; 4]) -> LinSrgb {
    let [hue, saturation, value, max] = hsvm;
    let hsv: Hsv = Hsv::new(hue * 360.0, saturation, value);
    let rgb: Srgb = Srgb::from_color(hsv);
    LinSrgb::new(rgb.red * max, rgb.green * max, rgb.blue * max)
}
