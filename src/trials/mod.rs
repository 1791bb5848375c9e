pub mod congruency;
pub mod picker;
pub mod rng;

pub use congruency::{
    build_canonical_color_map, build_congruency_trials, CanonicalColors, CongruencyConfig,
    TrialCountMode,
};
pub use picker::{build_picker_trials, seeded_hex, suggested_hex};
pub use rng::{fisher_yates, seed_from_run_id, Lcg};
