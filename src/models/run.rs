//! The `BatteryRun` aggregate root.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    CongruencyResponse, PickerResponse, PickerTrial, RunRecord, RunUnavailable,
    RUN_RECORD_VERSION,
};
use crate::trials::{build_picker_trials, seed_from_run_id};

const DEFAULT_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Fresh identifier for a new run.
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Stimulus lists for the picker phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PickerPlan {
    pub graphemes: Vec<String>,
    pub weekdays: Vec<String>,
}

impl Default for PickerPlan {
    fn default() -> Self {
        Self {
            graphemes: ('A'..='Z').map(|c| c.to_string()).collect(),
            weekdays: DEFAULT_WEEKDAYS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl PickerPlan {
    pub fn stimulus_count(&self) -> usize {
        self.graphemes.len() + self.weekdays.len()
    }
}

/// One subject's attempt at the battery.
///
/// Responses are only ever appended or replaced by identity; nothing here
/// deletes a response except [`BatteryRun::reset`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryRun {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub repeats: u32,
    pub picker_plan: PickerPlan,
    pub picker_responses: Vec<PickerResponse>,
    pub congruency_responses: Vec<CongruencyResponse>,
    pub meta: Option<serde_json::Value>,
}

impl BatteryRun {
    pub fn new(
        run_id: impl Into<String>,
        repeats: u32,
        picker_plan: PickerPlan,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            created_at,
            repeats,
            picker_plan,
            picker_responses: Vec::new(),
            congruency_responses: Vec::new(),
            meta: None,
        }
    }

    pub fn seed(&self) -> u32 {
        seed_from_run_id(&self.run_id)
    }

    /// The deterministic picker plan for this run; identical across reloads.
    pub fn picker_trials(&self) -> Vec<PickerTrial> {
        build_picker_trials(&self.picker_plan, self.repeats, self.seed())
    }

    /// Drops every response. Irreversible once persisted.
    pub fn reset(&mut self, created_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.picker_responses.clear();
        self.congruency_responses.clear();
    }

    pub fn to_record(&self) -> RunRecord {
        RunRecord {
            version: RUN_RECORD_VERSION,
            created_at_ms: self.created_at.timestamp_millis(),
            repeats: self.repeats,
            picker_plan: self.picker_plan.clone(),
            picker_responses: self.picker_responses.clone(),
            congruency_responses: self.congruency_responses.clone(),
            meta: self.meta.clone(),
        }
    }

    pub fn from_record(
        run_id: impl Into<String>,
        record: RunRecord,
    ) -> Result<Self, RunUnavailable> {
        if record.version != RUN_RECORD_VERSION {
            return Err(RunUnavailable::UnsupportedVersion(record.version));
        }
        let created_at = Utc
            .timestamp_millis_opt(record.created_at_ms)
            .single()
            .ok_or_else(|| {
                RunUnavailable::Corrupt(format!("invalid createdAtMs {}", record.created_at_ms))
            })?;

        Ok(Self {
            run_id: run_id.into(),
            created_at,
            repeats: record.repeats,
            picker_plan: record.picker_plan,
            picker_responses: record.picker_responses,
            congruency_responses: record.congruency_responses,
            meta: record.meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_matches_standard_stimuli() {
        let plan = PickerPlan::default();
        assert_eq!(plan.graphemes.len(), 26);
        assert_eq!(plan.graphemes.first().map(String::as_str), Some("A"));
        assert_eq!(plan.graphemes.last().map(String::as_str), Some("Z"));
        assert_eq!(plan.weekdays.first().map(String::as_str), Some("Monday"));
        assert_eq!(plan.weekdays.last().map(String::as_str), Some("Sunday"));
    }

    #[test]
    fn record_conversion_keeps_responses() {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let mut run = BatteryRun::new("run-1", 3, PickerPlan::default(), created_at);
        let trial = PickerTrial::new(crate::models::PickerKind::Grapheme, "A", 0);
        run.picker_responses
            .push(PickerResponse::with_color(&trial, 0, 10, "#FF0000").unwrap());

        let restored = BatteryRun::from_record("run-1", run.to_record()).unwrap();
        assert_eq!(restored, run);
    }

    #[test]
    fn rejects_other_versions() {
        let run = BatteryRun::new("run-1", 3, PickerPlan::default(), Utc::now());
        let mut record = run.to_record();
        record.version = 2;
        assert_eq!(
            BatteryRun::from_record("run-1", record),
            Err(RunUnavailable::UnsupportedVersion(2))
        );
    }
}
