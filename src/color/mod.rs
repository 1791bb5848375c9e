pub mod convert;
pub mod lab;

pub use convert::{
    apply_gray_blend, hex_to_rgb, hsv_to_rgb, normalize_hex, rgb_to_hex, rgb_to_hsv,
};
pub use lab::{delta_e76, rgb_to_lab};
