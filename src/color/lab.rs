//! sRGB to CIE L*a*b* (D65) and the ΔE76 distance used by the scorer.

use crate::models::{Lab, Rgb};

const REF_X: f64 = 95.047;
const REF_Y: f64 = 100.0;
const REF_Z: f64 = 108.883;

fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

pub fn rgb_to_lab(rgb: Rgb) -> Lab {
    let r = srgb_to_linear(rgb.r) * 100.0;
    let g = srgb_to_linear(rgb.g) * 100.0;
    let b = srgb_to_linear(rgb.b) * 100.0;

    let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
    let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
    let z = r * 0.0193 + g * 0.1192 + b * 0.9505;

    let fx = lab_f(x / REF_X);
    let fy = lab_f(y / REF_Y);
    let fz = lab_f(z / REF_Z);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Euclidean distance in L*a*b*. The only perceptual metric the battery uses.
pub fn delta_e76(a: Lab, b: Lab) -> f64 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn white_and_black() {
        let white = rgb_to_lab(Rgb::new(255, 255, 255));
        assert!(close(white.l, 100.0, 0.05), "L = {}", white.l);
        assert!(close(white.a, 0.0, 0.05));
        assert!(close(white.b, 0.0, 0.05));

        let black = rgb_to_lab(Rgb::new(0, 0, 0));
        assert!(close(black.l, 0.0, 1e-9));
    }

    #[test]
    fn red_reference_values() {
        let red = rgb_to_lab(Rgb::new(255, 0, 0));
        assert!(close(red.l, 53.24, 0.1), "L = {}", red.l);
        assert!(close(red.a, 80.09, 0.1), "a = {}", red.a);
        assert!(close(red.b, 67.20, 0.1), "b = {}", red.b);
    }

    #[test]
    fn delta_e_identity_and_symmetry() {
        let a = rgb_to_lab(Rgb::new(30, 144, 255));
        let b = rgb_to_lab(Rgb::new(255, 140, 0));
        assert_eq!(delta_e76(a, a), 0.0);
        assert_eq!(delta_e76(a, b), delta_e76(b, a));
        assert!(delta_e76(a, b) > 0.0);
    }
}
