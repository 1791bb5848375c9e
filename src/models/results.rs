use serde::{Deserialize, Serialize};

use crate::models::Rgb;

/// Per-stimulus consistency row. `repeats_rgb` always has `repeats` slots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PickerScoreRow {
    pub stimulus_text: String,
    pub repeats_rgb: Vec<Option<Rgb>>,
    pub mean_delta_e: f64,
}

/// Scored snapshot of a run. Lower `picker_score` means more consistent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatteryResults {
    pub picker_score: f64,
    pub picker_rows: Vec<PickerScoreRow>,
    pub congruency_accuracy_pct: f64,
    pub congruency_mean_rt_sec: f64,
}
