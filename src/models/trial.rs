//! Trial and response data models.
//!
//! Picker trials are identified by `(kind, stimulus, repeat)`; that identity is
//! what the recorder deduplicates on and what the scorer slots responses by.

use serde::{Deserialize, Deserializer, Serialize};

use crate::color::normalize_hex;
use crate::models::Rgb;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum PickerKind {
    Grapheme,
    Weekday,
}

impl PickerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickerKind::Grapheme => "grapheme",
            PickerKind::Weekday => "weekday",
        }
    }
}

/// Identity of one picker trial within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrialKey {
    pub kind: PickerKind,
    pub stimulus_text: String,
    pub repeat_index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PickerTrial {
    pub kind: PickerKind,
    pub stimulus_text: String,
    pub repeat_index: u32,
}

impl PickerTrial {
    pub fn new(kind: PickerKind, stimulus_text: impl Into<String>, repeat_index: u32) -> Self {
        Self {
            kind,
            stimulus_text: stimulus_text.into(),
            repeat_index,
        }
    }

    pub fn key(&self) -> TrialKey {
        TrialKey {
            kind: self.kind,
            stimulus_text: self.stimulus_text.clone(),
            repeat_index: i64::from(self.repeat_index),
        }
    }
}

/// One answered picker trial.
///
/// `is_no_color == true` implies `rgb` and `hex` are both absent. Otherwise `hex`
/// is canonical (`#` + six lowercase hex digits) and `rgb` is its decomposition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PickerResponse {
    pub stimulus_text: String,
    pub kind: PickerKind,
    pub repeat_index: i64,
    pub trial_index: usize,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub is_no_color: bool,
    #[serde(
        default,
        deserialize_with = "lenient_rgb",
        skip_serializing_if = "Option::is_none"
    )]
    pub rgb: Option<Rgb>,
    #[serde(
        default,
        deserialize_with = "lenient_hex",
        skip_serializing_if = "Option::is_none"
    )]
    pub hex: Option<String>,
}

/// An unreadable `rgb` reads as absent rather than failing the whole record.
fn lenient_rgb<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Rgb>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps any string (the scorer rejects bad ones); non-string values read as absent.
fn lenient_hex<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(hex) => Ok(Some(hex)),
        _ => Ok(None),
    }
}

impl PickerResponse {
    /// Builds a colored response. Returns `None` when `hex` is not a valid color.
    pub fn with_color(
        trial: &PickerTrial,
        trial_index: usize,
        timestamp_ms: i64,
        hex: &str,
    ) -> Option<Self> {
        let hex = normalize_hex(hex)?;
        let rgb = crate::color::hex_to_rgb(&hex)?;
        Some(Self {
            stimulus_text: trial.stimulus_text.clone(),
            kind: trial.kind,
            repeat_index: i64::from(trial.repeat_index),
            trial_index,
            timestamp_ms,
            is_no_color: false,
            rgb: Some(rgb),
            hex: Some(hex),
        })
    }

    pub fn no_color(trial: &PickerTrial, trial_index: usize, timestamp_ms: i64) -> Self {
        Self {
            stimulus_text: trial.stimulus_text.clone(),
            kind: trial.kind,
            repeat_index: i64::from(trial.repeat_index),
            trial_index,
            timestamp_ms,
            is_no_color: true,
            rgb: None,
            hex: None,
        }
    }

    pub fn key(&self) -> TrialKey {
        TrialKey {
            kind: self.kind,
            stimulus_text: self.stimulus_text.clone(),
            repeat_index: self.repeat_index,
        }
    }
}

/// A generated match/mismatch presentation. Not stored until answered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CongruencyTrial {
    pub stimulus_text: String,
    pub shown_hex: String,
    pub expected_match: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CongruencyResponse {
    pub trial_index: usize,
    pub timestamp_ms: i64,
    pub reaction_time_ms: f64,
    pub expected_match: bool,
    pub chosen_match: bool,
    pub correct: bool,
    pub stimulus_text: String,
    pub shown_hex: String,
}

impl CongruencyResponse {
    /// Records a judgment; `correct` is always derived, never supplied.
    pub fn answer(
        trial: &CongruencyTrial,
        trial_index: usize,
        timestamp_ms: i64,
        reaction_time_ms: f64,
        chosen_match: bool,
    ) -> Self {
        Self {
            trial_index,
            timestamp_ms,
            reaction_time_ms,
            expected_match: trial.expected_match,
            chosen_match,
            correct: chosen_match == trial.expected_match,
            stimulus_text: trial.stimulus_text.clone(),
            shown_hex: trial.shown_hex.clone(),
        }
    }
}
