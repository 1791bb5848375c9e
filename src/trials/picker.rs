//! Picker trial plan and per-trial starting colors.

use std::collections::HashSet;

use crate::color::rgb_to_hex;
use crate::models::{PickerKind, PickerPlan, PickerTrial, Rgb};
use crate::trials::rng::{fisher_yates, Lcg};

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;
const SUGGESTED_CHANNEL_MIN: u8 = 25;
const SUGGESTED_CHANNEL_MAX: u8 = 230;

/// Builds the shuffled picker plan for one run.
///
/// Trials are enumerated graphemes first, then weekdays, each stimulus with
/// repeats `0..repeats`, and then shuffled with an LCG seeded from `seed`.
/// A stimulus listed twice under the same kind is planned once.
pub fn build_picker_trials(plan: &PickerPlan, repeats: u32, seed: u32) -> Vec<PickerTrial> {
    let mut trials = Vec::with_capacity(plan.stimulus_count() * repeats as usize);

    for (kind, stimuli) in [
        (PickerKind::Grapheme, &plan.graphemes),
        (PickerKind::Weekday, &plan.weekdays),
    ] {
        let mut seen = HashSet::new();
        for stimulus in stimuli {
            if !seen.insert(stimulus.as_str()) {
                continue;
            }
            for repeat_index in 0..repeats {
                trials.push(PickerTrial::new(kind, stimulus.clone(), repeat_index));
            }
        }
    }

    let mut lcg = Lcg::new(seed);
    fisher_yates(&mut trials, |bound| lcg.next_index(bound));
    trials
}

fn fnv1a32(key: &str) -> u32 {
    key.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// Reproducible, non-extreme color for an arbitrary key.
pub fn seeded_hex(key: &str) -> String {
    let hash = fnv1a32(key);
    let channel = |shift: u32| {
        ((hash >> shift) & 0xff)
            .clamp(u32::from(SUGGESTED_CHANNEL_MIN), u32::from(SUGGESTED_CHANNEL_MAX)) as u8
    };
    rgb_to_hex(Rgb::new(channel(0), channel(8), channel(16)))
}

/// Starting color the picker UI shows for a trial.
pub fn suggested_hex(run_id: &str, trial: &PickerTrial) -> String {
    seeded_hex(&format!(
        "{}:{}:{}:{}",
        run_id,
        trial.kind.as_str(),
        trial.stimulus_text,
        trial.repeat_index
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv_reference_values() {
        assert_eq!(fnv1a32(""), 0x811c_9dc5);
        assert_eq!(fnv1a32("a"), 0xe40c_292c);
    }

    #[test]
    fn seeded_hex_is_stable_and_clamped() {
        let first = seeded_hex("run-1:grapheme:A:0");
        assert_eq!(first, seeded_hex("run-1:grapheme:A:0"));

        for i in 0..200 {
            let rgb = crate::color::hex_to_rgb(&seeded_hex(&format!("key-{i}"))).unwrap();
            for c in [rgb.r, rgb.g, rgb.b] {
                assert!((SUGGESTED_CHANNEL_MIN..=SUGGESTED_CHANNEL_MAX).contains(&c));
            }
        }
    }

    #[test]
    fn suggested_hex_depends_on_every_key_part() {
        let trial = PickerTrial::new(PickerKind::Grapheme, "A", 0);
        let base = suggested_hex("run-1", &trial);
        assert_ne!(base, suggested_hex("run-2", &trial));
        assert_ne!(
            base,
            suggested_hex("run-1", &PickerTrial::new(PickerKind::Grapheme, "A", 1))
        );
    }

    #[test]
    fn duplicate_stimuli_are_planned_once() {
        let plan = PickerPlan {
            graphemes: vec!["A".into(), "A".into(), "B".into()],
            weekdays: vec![],
        };
        assert_eq!(build_picker_trials(&plan, 2, 9).len(), 4);
    }

    #[test]
    fn zero_repeats_yields_empty_plan() {
        assert!(build_picker_trials(&PickerPlan::default(), 0, 1).is_empty());
    }
}
