//! Applying answered trials to a run.
//!
//! A run holds at most one picker response per `(kind, stimulus, repeat)`.
//! Re-submitting an identity replaces the stored response, so retrying a
//! submission after a failed save is always safe.

use std::collections::HashSet;

use crate::models::{BatteryRun, CongruencyResponse, PickerResponse, PickerTrial, TrialKey};

/// Inserts `response`, replacing any earlier response with the same identity.
/// Returns `true` when an earlier response was replaced.
pub fn record_picker_response(run: &mut BatteryRun, response: PickerResponse) -> bool {
    let key = response.key();
    let before = run.picker_responses.len();
    run.picker_responses.retain(|existing| existing.key() != key);
    let replaced = run.picker_responses.len() != before;
    run.picker_responses.push(response);
    replaced
}

/// Inserts a congruency judgment, replacing any earlier one for the same trial index.
pub fn record_congruency_response(run: &mut BatteryRun, response: CongruencyResponse) -> bool {
    let before = run.congruency_responses.len();
    run.congruency_responses
        .retain(|existing| existing.trial_index != response.trial_index);
    let replaced = run.congruency_responses.len() != before;
    run.congruency_responses.push(response);
    replaced
}

/// Index of the first plan entry without a response, or `None` when every trial is answered.
pub fn first_unanswered_index(trials: &[PickerTrial], responses: &[PickerResponse]) -> Option<usize> {
    let answered: HashSet<TrialKey> = responses.iter().map(PickerResponse::key).collect();
    trials
        .iter()
        .position(|trial| !answered.contains(&trial.key()))
}

pub fn is_picker_complete(run: &BatteryRun) -> bool {
    first_unanswered_index(&run.picker_trials(), &run.picker_responses).is_none()
}

pub fn is_congruency_complete(run: &BatteryRun, congruency_trial_count: usize) -> bool {
    run.congruency_responses.len() >= congruency_trial_count
}
