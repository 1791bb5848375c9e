use std::collections::HashSet;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::models::{BatteryRun, CongruencyTrial, PickerResponse, PickerTrial, TrialKey};
use crate::recorder::{first_unanswered_index, is_congruency_complete, is_picker_complete};
use crate::trials::{build_congruency_trials, CongruencyConfig};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BatteryPhase {
    Picker,
    Congruency,
    Complete,
    /// Picker phase finished without a single colored response.
    InsufficientData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatteryProgress {
    pub run_id: String,
    pub phase: BatteryPhase,
    pub picker_answered: usize,
    pub picker_total: usize,
    pub congruency_answered: usize,
    pub congruency_total: usize,
}

/// In-memory authoritative state of one open run.
///
/// Stored state may lag behind this after a failed save; the next successful
/// save of the full record reconciles it.
pub struct BatteryState {
    pub run: BatteryRun,
    picker_trials: Vec<PickerTrial>,
    /// Generated once the picker phase is complete; resumed by answered count.
    congruency_trials: Option<Vec<CongruencyTrial>>,
    rng: StdRng,
}

impl BatteryState {
    pub fn new(run: BatteryRun) -> Self {
        Self::with_rng(run, StdRng::from_entropy())
    }

    pub fn with_rng(run: BatteryRun, rng: StdRng) -> Self {
        let picker_trials = run.picker_trials();
        Self {
            run,
            picker_trials,
            congruency_trials: None,
            rng,
        }
    }

    pub fn picker_trials(&self) -> &[PickerTrial] {
        &self.picker_trials
    }

    pub fn next_picker_index(&self) -> Option<usize> {
        first_unanswered_index(&self.picker_trials, &self.run.picker_responses)
    }

    pub fn picker_answered(&self) -> usize {
        let answered: HashSet<TrialKey> = self
            .run
            .picker_responses
            .iter()
            .map(PickerResponse::key)
            .collect();
        self.picker_trials
            .iter()
            .filter(|trial| answered.contains(&trial.key()))
            .count()
    }

    /// Congruency trials, generating them on first use once the picker phase is done.
    pub fn congruency_trials(&mut self, config: &CongruencyConfig) -> Option<&[CongruencyTrial]> {
        if self.next_picker_index().is_some() {
            return None;
        }
        if self.congruency_trials.is_none() {
            let trials = build_congruency_trials(&self.run, config, &mut self.rng);
            self.congruency_trials = Some(trials);
        }
        self.congruency_trials.as_deref()
    }

    pub fn next_congruency_index(&mut self, config: &CongruencyConfig) -> Option<usize> {
        let answered = self.run.congruency_responses.len();
        let total = self.congruency_trials(config)?.len();
        (answered < total).then_some(answered)
    }

    pub fn phase(&mut self, config: &CongruencyConfig) -> BatteryPhase {
        if !is_picker_complete(&self.run) {
            return BatteryPhase::Picker;
        }
        match self.congruency_trials(config).map(<[CongruencyTrial]>::len) {
            Some(0) | None => BatteryPhase::InsufficientData,
            Some(total) if is_congruency_complete(&self.run, total) => BatteryPhase::Complete,
            Some(_) => BatteryPhase::Congruency,
        }
    }

    pub fn progress(&mut self, config: &CongruencyConfig) -> BatteryProgress {
        let phase = self.phase(config);
        let congruency_total = self
            .congruency_trials
            .as_ref()
            .map(Vec::len)
            .unwrap_or(0);
        BatteryProgress {
            run_id: self.run.run_id.clone(),
            phase,
            picker_answered: self.picker_answered(),
            picker_total: self.picker_trials.len(),
            congruency_answered: self.run.congruency_responses.len(),
            congruency_total,
        }
    }

    /// Forgets generated congruency trials so they are rebuilt from current responses.
    pub fn invalidate_congruency_trials(&mut self) {
        self.congruency_trials = None;
    }
}
