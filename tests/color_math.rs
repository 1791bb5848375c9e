//! Round-trip and metric properties of the color conversions.

use synesthesia_battery_lib::color::{
    delta_e76, hex_to_rgb, hsv_to_rgb, rgb_to_hex, rgb_to_hsv, rgb_to_lab,
};
use synesthesia_battery_lib::models::Rgb;

// ─── helpers ─────────────────────────────────────────────────────────────────

fn sample_colors() -> Vec<Rgb> {
    let steps = [0u8, 1, 17, 64, 127, 128, 200, 254, 255];
    let mut colors = Vec::new();
    for &r in &steps {
        for &g in &steps {
            for &b in &steps {
                colors.push(Rgb::new(r, g, b));
            }
        }
    }
    colors
}

// ─── hex ─────────────────────────────────────────────────────────────────────

#[test]
fn hex_round_trip_is_case_normalized() {
    for hex in ["#A1b2C3", "a1b2c3", "#000000", "#FFFFFF", "7f7f7f"] {
        let rgb = hex_to_rgb(hex).expect("valid hex");
        let canonical = format!("#{}", hex.trim_start_matches('#').to_ascii_lowercase());
        assert_eq!(rgb_to_hex(rgb), canonical);
    }
}

#[test]
fn rgb_round_trip_through_hex_is_exact() {
    for rgb in sample_colors() {
        assert_eq!(hex_to_rgb(&rgb_to_hex(rgb)), Some(rgb));
    }
}

#[test]
fn rgb_round_trip_through_hsv_is_exact_after_rounding() {
    for rgb in sample_colors() {
        assert_eq!(hsv_to_rgb(rgb_to_hsv(rgb)), rgb, "{rgb:?}");
    }
}

// ─── ΔE76 ────────────────────────────────────────────────────────────────────

#[test]
fn delta_e_is_symmetric_with_zero_identity() {
    let colors = sample_colors();
    for pair in colors.windows(2) {
        let a = rgb_to_lab(pair[0]);
        let b = rgb_to_lab(pair[1]);
        assert_eq!(delta_e76(a, a), 0.0);
        assert_eq!(delta_e76(a, b), delta_e76(b, a));
    }
}

#[test]
fn red_and_blue_are_far_apart() {
    let d = delta_e76(
        rgb_to_lab(Rgb::new(255, 0, 0)),
        rgb_to_lab(Rgb::new(0, 0, 255)),
    );
    assert!(d > 100.0, "ΔE(red, blue) = {d}");
    assert!((d - 176.3).abs() < 1.0, "ΔE(red, blue) = {d}");
}
