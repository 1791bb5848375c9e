//! Persisted run record (JSON, versioned).

use serde::{Deserialize, Serialize};

use crate::models::{CongruencyResponse, PickerPlan, PickerResponse};

pub const RUN_RECORD_VERSION: u64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub version: u64,
    pub created_at_ms: i64,
    pub repeats: u32,
    pub picker_plan: PickerPlan,
    #[serde(default)]
    pub picker_responses: Vec<PickerResponse>,
    #[serde(default)]
    pub congruency_responses: Vec<CongruencyResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl RunRecord {
    /// Parses a stored payload, rejecting anything that is not a version 1 record.
    ///
    /// The version is checked before the body so that a newer layout reports
    /// `UnsupportedVersion` rather than a shape mismatch.
    pub fn from_json(payload: &str) -> Result<Self, RunUnavailable> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|err| RunUnavailable::Corrupt(format!("invalid JSON: {err}")))?;

        match value.get("version").and_then(serde_json::Value::as_u64) {
            Some(RUN_RECORD_VERSION) => {}
            Some(other) => return Err(RunUnavailable::UnsupportedVersion(other)),
            None => return Err(RunUnavailable::Corrupt("missing version".into())),
        }

        serde_json::from_value(value)
            .map_err(|err| RunUnavailable::Corrupt(format!("invalid run record: {err}")))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Why a stored run cannot be used. The caller decides whether to start fresh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunUnavailable {
    #[error("run record not found")]
    Missing,
    #[error("run record version {0} is not supported")]
    UnsupportedVersion(u64),
    #[error("run record is corrupt: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_record() {
        let payload = r##"{
            "version": 1,
            "createdAtMs": 1700000000000,
            "repeats": 3,
            "pickerPlan": { "graphemes": ["A"], "weekdays": [] },
            "pickerResponses": [
                { "stimulusText": "A", "kind": "grapheme", "repeatIndex": 0,
                  "trialIndex": 0, "timestampMs": 5, "isNoColor": false,
                  "rgb": { "r": 255, "g": 0, "b": 0 }, "hex": "#ff0000" }
            ],
            "congruencyResponses": []
        }"##;

        let record = RunRecord::from_json(payload).unwrap();
        assert_eq!(record.repeats, 3);
        assert_eq!(record.picker_responses.len(), 1);
        assert_eq!(record.picker_responses[0].hex.as_deref(), Some("#ff0000"));
        assert!(record.meta.is_none());
    }

    #[test]
    fn malformed_color_fields_do_not_spoil_the_record() {
        let payload = r##"{
            "version": 1,
            "createdAtMs": 1700000000000,
            "repeats": 2,
            "pickerPlan": { "graphemes": ["A"], "weekdays": [] },
            "pickerResponses": [
                { "stimulusText": "A", "kind": "grapheme", "repeatIndex": 0,
                  "trialIndex": 0, "timestampMs": 5,
                  "rgb": { "r": 300, "g": 0, "b": 0 }, "hex": 16711680 },
                { "stimulusText": "A", "kind": "grapheme", "repeatIndex": 1,
                  "trialIndex": 1, "timestampMs": 6,
                  "rgb": "red", "hex": "#00ff00" }
            ]
        }"##;

        let record = RunRecord::from_json(payload).unwrap();
        assert_eq!(record.picker_responses[0].rgb, None);
        assert_eq!(record.picker_responses[0].hex, None);
        assert_eq!(record.picker_responses[1].rgb, None);
        assert_eq!(record.picker_responses[1].hex.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn corrupt_reason_is_displayed() {
        let err = RunUnavailable::Corrupt("missing version".into());
        assert_eq!(err.to_string(), "run record is corrupt: missing version");
    }

    #[test]
    fn reports_unsupported_version() {
        let payload = r#"{ "version": 2, "something": "else" }"#;
        assert_eq!(
            RunRecord::from_json(payload),
            Err(RunUnavailable::UnsupportedVersion(2))
        );
    }

    #[test]
    fn reports_corrupt_payloads() {
        assert!(matches!(
            RunRecord::from_json("not json"),
            Err(RunUnavailable::Corrupt(_))
        ));
        assert!(matches!(
            RunRecord::from_json(r#"{ "repeats": 3 }"#),
            Err(RunUnavailable::Corrupt(_))
        ));
        assert!(matches!(
            RunRecord::from_json(r#"{ "version": 1, "repeats": "three" }"#),
            Err(RunUnavailable::Corrupt(_))
        ));
    }
}
