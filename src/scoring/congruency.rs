use crate::models::CongruencyResponse;

/// Percentage of correct judgments; 0 when there are none.
pub fn congruency_accuracy_pct(responses: &[CongruencyResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let correct = responses.iter().filter(|r| r.correct).count();
    100.0 * correct as f64 / responses.len() as f64
}

/// Mean reaction time in seconds; 0 when there are no responses.
pub fn congruency_mean_rt_sec(responses: &[CongruencyResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let total: f64 = responses
        .iter()
        .map(|r| finite_or_zero(r.reaction_time_ms) / 1000.0)
        .sum();
    total / responses.len() as f64
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
