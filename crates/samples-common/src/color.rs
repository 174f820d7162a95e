//! Color space helpers shared by the samples' texture and output code.

use crate::geometry::Vec3;

/// `h` wraps around, `s` and `v` are expected in `[0, 1]`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    if s == 0.0 {
        return Vec3::splat(v);
    }

    let h = h - h.floor();
    let hi = (h * 6.0) as i32;
    let f = h * 6.0 - hi as f32;
    let m = v * (1.0 - s);
    let n = v * (1.0 - s * f);
    let k = v * (1.0 - s * (1.0 - f));
    match hi {
        0 => Vec3(v, k, m),
        1 => Vec3(n, v, m),
        2 => Vec3(m, v, k),
        3 => Vec3(m, n, v),
        4 => Vec3(k, m, v),
        5 => Vec3(v, m, n),
        _ => Vec3::zero(),
    }
}

/// sRGB encoded -> linear. Negative input is a caller bug, checked in debug builds only.
pub fn srgb_degamma_s(value: f32) -> f32 {
    debug_assert!(value >= 0.0, "input value must be equal to or greater than 0: {value}");
    if value <= 0.04045 {
        return value / 12.92;
    }
    ((value + 0.055) / 1.055).powf(2.4)
}

/// Linear -> sRGB encoded. Negative input is a caller bug, checked in debug builds only.
pub fn srgb_gamma_s(value: f32) -> f32 {
    debug_assert!(value >= 0.0, "input value must be equal to or greater than 0: {value}");
    if value <= 0.0031308 {
        return 12.92 * value;
    }
    1.055 * value.powf(1.0 / 2.4) - 0.055
}

pub fn srgb_degamma(value: Vec3) -> Vec3 {
    value.map(srgb_degamma_s)
}

pub fn srgb_gamma(value: Vec3) -> Vec3 {
    value.map(srgb_gamma_s)
}
