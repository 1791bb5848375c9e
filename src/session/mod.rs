pub mod controller;
pub mod state;

pub use controller::{BatteryController, CongruencyPrompt, PickerPrompt, SubmitOutcome};
pub use state::{BatteryPhase, BatteryProgress, BatteryState};
