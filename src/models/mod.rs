pub mod color;
pub mod record;
pub mod results;
pub mod run;
pub mod trial;

pub use color::{Hsv, Lab, Rgb};
pub use record::{RunRecord, RunUnavailable, RUN_RECORD_VERSION};
pub use results::{BatteryResults, PickerScoreRow};
pub use run::{generate_run_id, BatteryRun, PickerPlan};
pub use trial::{
    CongruencyResponse, CongruencyTrial, PickerKind, PickerResponse, PickerTrial, TrialKey,
};
