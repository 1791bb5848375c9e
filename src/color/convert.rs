//! Hex, RGB and HSV conversions.
//!
//! Every function that produces an [`Rgb`] rounds to the nearest integer and
//! clamps into `[0, 255]`.

use crate::models::{Hsv, Rgb};

/// Canonicalises a hex color to `#rrggbb`.
///
/// Accepts either case and an optional leading `#`. Returns `None` for anything
/// that is not exactly six hex digits.
pub fn normalize_hex(input: &str) -> Option<String> {
    let digits = input.strip_prefix('#').unwrap_or(input);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", digits.to_ascii_lowercase()))
}

pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let hex = normalize_hex(hex)?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Rgb::new(channel(1..3)?, channel(3..5)?, channel(5..7)?))
}

pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

fn to_channel(unit: f64) -> u8 {
    let scaled = (unit * 255.0).round();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, 255.0) as u8
}

fn wrap_hue(h: f64) -> f64 {
    if !h.is_finite() {
        return 0.0;
    }
    let wrapped = h.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let h = wrap_hue(hsv.h);
    let s = hsv.s.clamp(0.0, 1.0);
    let v = hsv.v.clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r1, g1, b1) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb::new(to_channel(r1 + m), to_channel(g1 + m), to_channel(b1 + m))
}

pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = f64::from(rgb.r) / 255.0;
    let g = f64::from(rgb.g) / 255.0;
    let b = f64::from(rgb.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let s = if max == 0.0 { 0.0 } else { delta / max };

    Hsv {
        h: wrap_hue(h),
        s,
        v: max,
    }
}

/// Pulls each channel toward the color's luminance gray.
///
/// `gray_amount` is clamped to `[0, 1]`; 0 returns the input, 1 returns pure gray.
pub fn apply_gray_blend(rgb: Rgb, gray_amount: f64) -> Rgb {
    let amount = if gray_amount.is_nan() {
        0.0
    } else {
        gray_amount.clamp(0.0, 1.0)
    };
    let gray = (0.2126 * f64::from(rgb.r) + 0.7152 * f64::from(rgb.g) + 0.0722 * f64::from(rgb.b))
        .round();

    let mix = |channel: u8| {
        let c = f64::from(channel);
        (c + (gray - c) * amount).round().clamp(0.0, 255.0) as u8
    };

    Rgb::new(mix(rgb.r), mix(rgb.g), mix(rgb.b))
}
