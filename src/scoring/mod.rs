pub mod congruency;
pub mod picker;

pub use congruency::{congruency_accuracy_pct, congruency_mean_rt_sec};
pub use picker::{picker_score, score_picker_rows};

use crate::models::{BatteryResults, BatteryRun};

/// Scores a run snapshot.
///
/// Pure: the same snapshot always produces the same results, and degenerate
/// input (no stimuli, no responses, zero repeats) yields zeros rather than NaN.
pub fn score_battery(run: &BatteryRun, repeats: u32) -> BatteryResults {
    let picker_rows = score_picker_rows(&run.picker_responses, repeats);

    BatteryResults {
        picker_score: picker_score(&picker_rows),
        picker_rows,
        congruency_accuracy_pct: congruency_accuracy_pct(&run.congruency_responses),
        congruency_mean_rt_sec: congruency_mean_rt_sec(&run.congruency_responses),
    }
}
