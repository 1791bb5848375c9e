//! Congruency (match/mismatch) trial generation.
//!
//! Trials are derived from each stimulus' canonical color: the first colored
//! picker response recorded for it. Two trial-count policies exist and are
//! selected through [`CongruencyConfig`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::{normalize_hex, rgb_to_hex};
use crate::models::{BatteryRun, CongruencyTrial, Rgb};
use crate::trials::rng::fisher_yates;

const DEFAULT_PER_STIMULUS: usize = 2;
pub const DEFAULT_FIXED_TRIAL_COUNT: usize = 40;
const MAX_DISTINCT_DRAWS: usize = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TrialCountMode {
    /// `per_stimulus` congruent plus `per_stimulus` incongruent trials per stimulus, shuffled.
    #[default]
    PerStimulus,
    /// Exactly `n` trials cycling through stimuli, alternating match/mismatch.
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CongruencyConfig {
    pub trial_count_mode: TrialCountMode,
    #[serde(default = "default_per_stimulus")]
    pub per_stimulus: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<usize>,
}

fn default_per_stimulus() -> usize {
    DEFAULT_PER_STIMULUS
}

impl Default for CongruencyConfig {
    fn default() -> Self {
        Self {
            trial_count_mode: TrialCountMode::PerStimulus,
            per_stimulus: DEFAULT_PER_STIMULUS,
            n: None,
        }
    }
}

impl CongruencyConfig {
    pub fn fixed(n: usize) -> Self {
        Self {
            trial_count_mode: TrialCountMode::Fixed,
            per_stimulus: DEFAULT_PER_STIMULUS,
            n: Some(n),
        }
    }

    pub fn fixed_count(&self) -> usize {
        self.n.unwrap_or(DEFAULT_FIXED_TRIAL_COUNT)
    }
}

/// Stimulus to canonical hex, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalColors {
    entries: Vec<(String, String)>,
}

impl CanonicalColors {
    pub fn get(&self, stimulus: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(s, _)| s == stimulus)
            .map(|(_, hex)| hex.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, h)| (s.as_str(), h.as_str()))
    }

    fn insert_if_absent(&mut self, stimulus: &str, hex: String) {
        if self.get(stimulus).is_none() {
            self.entries.push((stimulus.to_string(), hex));
        }
    }

    /// Colors of every stimulus except `stimulus`.
    fn others(&self, stimulus: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(s, _)| s != stimulus)
            .map(|(_, hex)| hex.as_str())
            .collect()
    }
}

/// First-wins canonical color per stimulus, in response order.
///
/// Unlike the recorder's replace-by-identity rule, a later response never
/// overwrites the canonical color. No-color responses and unparsable hex are skipped.
pub fn build_canonical_color_map(run: &BatteryRun) -> CanonicalColors {
    let mut colors = CanonicalColors::default();
    for response in &run.picker_responses {
        if response.is_no_color {
            continue;
        }
        if let Some(hex) = response.hex.as_deref().and_then(normalize_hex) {
            colors.insert_if_absent(&response.stimulus_text, hex);
        }
    }
    colors
}

/// Builds the congruency trial set for a run.
///
/// Returns an empty list when no stimulus has a canonical color; callers must
/// treat that as insufficient data, not as a finished test.
pub fn build_congruency_trials<R: Rng + ?Sized>(
    run: &BatteryRun,
    config: &CongruencyConfig,
    rng: &mut R,
) -> Vec<CongruencyTrial> {
    let colors = build_canonical_color_map(run);
    if colors.is_empty() {
        return Vec::new();
    }

    match config.trial_count_mode {
        TrialCountMode::PerStimulus => per_stimulus_trials(&colors, config.per_stimulus, rng),
        TrialCountMode::Fixed => fixed_trials(&colors, config.fixed_count(), rng),
    }
}

fn per_stimulus_trials<R: Rng + ?Sized>(
    colors: &CanonicalColors,
    per_stimulus: usize,
    rng: &mut R,
) -> Vec<CongruencyTrial> {
    let mut trials = Vec::with_capacity(colors.len() * per_stimulus * 2);

    for (stimulus, hex) in colors.iter() {
        let pool = colors.others(stimulus);
        for _ in 0..per_stimulus {
            trials.push(CongruencyTrial {
                stimulus_text: stimulus.to_string(),
                shown_hex: hex.to_string(),
                expected_match: true,
            });
        }
        for _ in 0..per_stimulus {
            trials.push(CongruencyTrial {
                stimulus_text: stimulus.to_string(),
                shown_hex: distinct_color(&pool, hex, rng),
                expected_match: false,
            });
        }
    }

    fisher_yates(&mut trials, |bound| rng.gen_range(0..bound));
    trials
}

fn fixed_trials<R: Rng + ?Sized>(
    colors: &CanonicalColors,
    count: usize,
    rng: &mut R,
) -> Vec<CongruencyTrial> {
    let entries: Vec<(&str, &str)> = colors.iter().collect();

    (0..count)
        .map(|i| {
            let (stimulus, hex) = entries[(i * 7 + 3) % entries.len()];
            let expected_match = i % 2 == 0;
            let shown_hex = if expected_match {
                hex.to_string()
            } else {
                distinct_color(&colors.others(stimulus), hex, rng)
            };
            CongruencyTrial {
                stimulus_text: stimulus.to_string(),
                shown_hex,
                expected_match,
            }
        })
        .collect()
}

/// Picks a pool color that differs from `target`.
///
/// Tries up to [`MAX_DISTINCT_DRAWS`] random draws, then falls back to the first
/// pool entry even if it equals the target. An empty pool yields a random color
/// guaranteed to differ.
fn distinct_color<R: Rng + ?Sized>(pool: &[&str], target: &str, rng: &mut R) -> String {
    if pool.is_empty() {
        return random_distinct_hex(target, rng);
    }

    for _ in 0..MAX_DISTINCT_DRAWS {
        let candidate = pool[rng.gen_range(0..pool.len())];
        if candidate != target {
            return candidate.to_string();
        }
    }
    pool[0].to_string()
}

fn random_distinct_hex<R: Rng + ?Sized>(target: &str, rng: &mut R) -> String {
    let rgb = Rgb::new(rng.gen(), rng.gen(), rng.gen());
    let hex = rgb_to_hex(rgb);
    if hex != target {
        return hex;
    }
    // Inverting every channel always changes the color.
    rgb_to_hex(Rgb::new(255 - rgb.r, 255 - rgb.g, 255 - rgb.b))
}
