use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::db::RunStore;
use crate::models::{
    BatteryResults, BatteryRun, CongruencyResponse, CongruencyTrial, PickerResponse, PickerTrial,
    RunRecord,
};
use crate::recorder::{record_congruency_response, record_picker_response};
use crate::scoring::score_battery;
use crate::settings::BatterySettings;
use crate::trials::suggested_hex;

use super::{BatteryProgress, BatteryState};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PickerPrompt {
    pub index: usize,
    pub total: usize,
    pub trial: PickerTrial,
    pub suggested_hex: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CongruencyPrompt {
    pub index: usize,
    pub total: usize,
    pub trial: CongruencyTrial,
}

/// Result of applying one answer.
///
/// The answer is always applied locally. `persist_warning` is set when the
/// save that followed failed; the subject may continue regardless.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub replaced: bool,
    pub next_index: Option<usize>,
    pub persist_warning: Option<String>,
}

/// Drives one run: apply each answer locally, then persist best-effort.
pub struct BatteryController<S: RunStore> {
    state: Arc<Mutex<BatteryState>>,
    store: S,
    settings: BatterySettings,
}

impl<S: RunStore> BatteryController<S> {
    /// Resumes the stored run, or creates and saves a new one when none exists.
    ///
    /// A stored record that cannot be used (wrong version, corrupt payload) is
    /// returned as an error; use [`BatteryController::start_fresh`] to overwrite it.
    pub async fn open(store: S, run_id: &str, settings: BatterySettings) -> Result<Self> {
        let state = match store.load_run(run_id).await? {
            Some(record) => {
                let run = BatteryRun::from_record(run_id, record)?;
                crate::log_info!(
                    "Resumed run {} ({} picker, {} congruency responses)",
                    run_id,
                    run.picker_responses.len(),
                    run.congruency_responses.len()
                );
                BatteryState::new(run)
            }
            None => {
                let run = BatteryRun::new(
                    run_id,
                    settings.repeats,
                    settings.picker_plan(),
                    Utc::now(),
                );
                if let Err(err) = store.save_run(run_id, &run.to_record()).await {
                    crate::log_warn!("Created run {run_id} but could not save it yet: {err:#}");
                } else {
                    crate::log_info!("Created run {run_id}");
                }
                BatteryState::new(run)
            }
        };

        Ok(Self::from_state(store, state, settings))
    }

    /// Starts an empty run under `run_id`, overwriting anything stored.
    pub async fn start_fresh(store: S, run_id: &str, settings: BatterySettings) -> Result<Self> {
        let run = BatteryRun::new(run_id, settings.repeats, settings.picker_plan(), Utc::now());
        store.save_run(run_id, &run.to_record()).await?;
        crate::log_info!("Started fresh run {run_id}");
        Ok(Self::from_state(store, BatteryState::new(run), settings))
    }

    /// Like [`BatteryController::open`] but with a caller-supplied generator for congruency trials.
    pub async fn open_with_rng(
        store: S,
        run_id: &str,
        settings: BatterySettings,
        rng: StdRng,
    ) -> Result<Self> {
        let controller = Self::open(store, run_id, settings).await?;
        {
            let mut state = controller.state.lock().await;
            let run = state.run.clone();
            *state = BatteryState::with_rng(run, rng);
        }
        Ok(controller)
    }

    fn from_state(store: S, state: BatteryState, settings: BatterySettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            store,
            settings,
        }
    }

    pub async fn run_id(&self) -> String {
        self.state.lock().await.run.run_id.clone()
    }

    /// Copy of the current in-memory run.
    pub async fn snapshot(&self) -> BatteryRun {
        self.state.lock().await.run.clone()
    }

    pub async fn progress(&self) -> BatteryProgress {
        self.state.lock().await.progress(&self.settings.congruency)
    }

    pub async fn current_picker_trial(&self) -> Option<PickerPrompt> {
        let state = self.state.lock().await;
        let index = state.next_picker_index()?;
        let trial = state.picker_trials()[index].clone();
        Some(PickerPrompt {
            index,
            total: state.picker_trials().len(),
            suggested_hex: suggested_hex(&state.run.run_id, &trial),
            trial,
        })
    }

    /// Answers picker trial `trial_index` with a hex color, or "no color" when `hex` is `None`.
    ///
    /// Any plan position may be (re)answered; the stored response for that
    /// identity is replaced.
    pub async fn answer_picker(
        &self,
        trial_index: usize,
        hex: Option<&str>,
        timestamp_ms: i64,
    ) -> Result<SubmitOutcome> {
        let (record, replaced, next_index) = {
            let mut state = self.state.lock().await;
            let trial = state
                .picker_trials()
                .get(trial_index)
                .cloned()
                .ok_or_else(|| anyhow!("picker trial {trial_index} is not in the plan"))?;

            let response = match hex {
                Some(hex) => PickerResponse::with_color(&trial, trial_index, timestamp_ms, hex)
                    .ok_or_else(|| anyhow!("invalid color '{hex}'"))?,
                None => PickerResponse::no_color(&trial, trial_index, timestamp_ms),
            };

            let replaced = record_picker_response(&mut state.run, response);
            if state.run.congruency_responses.is_empty() {
                state.invalidate_congruency_trials();
            }
            (state.run.to_record(), replaced, state.next_picker_index())
        };

        Ok(SubmitOutcome {
            replaced,
            next_index,
            persist_warning: self.persist(&record).await,
        })
    }

    pub async fn current_congruency_trial(&self) -> Option<CongruencyPrompt> {
        let mut state = self.state.lock().await;
        let index = state.next_congruency_index(&self.settings.congruency)?;
        let trials = state.congruency_trials(&self.settings.congruency)?;
        Some(CongruencyPrompt {
            index,
            total: trials.len(),
            trial: trials[index].clone(),
        })
    }

    /// Records the subject's match/mismatch judgment for the next congruency trial.
    pub async fn answer_congruency(
        &self,
        chosen_match: bool,
        reaction_time_ms: f64,
        timestamp_ms: i64,
    ) -> Result<SubmitOutcome> {
        let (record, replaced, next_index) = {
            let mut state = self.state.lock().await;
            let config = &self.settings.congruency;
            let Some(index) = state.next_congruency_index(config) else {
                bail!("no congruency trial is awaiting an answer");
            };
            let trial = match state.congruency_trials(config) {
                Some(trials) => trials[index].clone(),
                None => bail!("congruency trials are not available yet"),
            };

            let response =
                CongruencyResponse::answer(&trial, index, timestamp_ms, reaction_time_ms, chosen_match);
            let replaced = record_congruency_response(&mut state.run, response);
            (
                state.run.to_record(),
                replaced,
                state.next_congruency_index(config),
            )
        };

        Ok(SubmitOutcome {
            replaced,
            next_index,
            persist_warning: self.persist(&record).await,
        })
    }

    /// Scores the in-memory snapshot.
    pub async fn results(&self) -> BatteryResults {
        let state = self.state.lock().await;
        score_battery(&state.run, state.run.repeats)
    }

    /// Clears saved progress. Local state is reset even if the save fails.
    pub async fn restart(&self) -> Result<()> {
        let (run_id, record) = {
            let mut state = self.state.lock().await;
            state.run.reset(Utc::now());
            state.invalidate_congruency_trials();
            (state.run.run_id.clone(), state.run.to_record())
        };

        self.store.save_run(&run_id, &record).await?;
        crate::log_info!("Restarted run {run_id}");
        Ok(())
    }

    async fn persist(&self, record: &RunRecord) -> Option<String> {
        let run_id = self.run_id().await;
        match self.store.save_run(&run_id, record).await {
            Ok(()) => None,
            Err(err) => {
                crate::log_warn!("Failed to save run {run_id}; continuing with local state: {err:#}");
                Some(format!("progress not saved: {err:#}"))
            }
        }
    }
}
