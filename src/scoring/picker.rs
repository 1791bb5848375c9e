use std::cmp::Ordering;
use std::collections::HashMap;

use crate::color::{delta_e76, hex_to_rgb, rgb_to_lab};
use crate::models::{PickerResponse, PickerScoreRow, Rgb};

/// Color a response contributes to scoring, if any.
///
/// A present but unparsable hex counts as no color. The `rgb` field is only
/// consulted when no hex was stored.
fn scored_rgb(response: &PickerResponse) -> Option<Rgb> {
    if response.is_no_color {
        return None;
    }
    match response.hex.as_deref() {
        Some(hex) => hex_to_rgb(hex),
        None => response.rgb,
    }
}

/// Builds one row per stimulus, sorted for display.
///
/// Responses whose `repeat_index` falls outside `[0, repeats)` are dropped.
pub fn score_picker_rows(responses: &[PickerResponse], repeats: u32) -> Vec<PickerScoreRow> {
    let slots = repeats as usize;
    let mut by_stimulus: HashMap<&str, Vec<Option<Rgb>>> = HashMap::new();

    for response in responses {
        let row = by_stimulus
            .entry(response.stimulus_text.as_str())
            .or_insert_with(|| vec![None; slots]);

        let Ok(index) = usize::try_from(response.repeat_index) else {
            continue;
        };
        if index >= slots {
            continue;
        }
        row[index] = scored_rgb(response);
    }

    let mut rows: Vec<PickerScoreRow> = by_stimulus
        .into_iter()
        .map(|(stimulus, repeats_rgb)| PickerScoreRow {
            stimulus_text: stimulus.to_string(),
            mean_delta_e: mean_pairwise_delta_e(&repeats_rgb),
            repeats_rgb,
        })
        .collect();

    rows.sort_by(|a, b| compare_stimulus(&a.stimulus_text, &b.stimulus_text));
    rows
}

/// Mean ΔE76 over all pairs of non-null slots; 0 when fewer than two colors.
fn mean_pairwise_delta_e(colors: &[Option<Rgb>]) -> f64 {
    let labs: Vec<_> = colors.iter().flatten().map(|rgb| rgb_to_lab(*rgb)).collect();

    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in labs.iter().enumerate() {
        for b in &labs[i + 1..] {
            total += delta_e76(*a, *b);
            pairs += 1;
        }
    }

    if pairs == 0 {
        0.0
    } else {
        total / pairs as f64
    }
}

/// Mean of the rows' `mean_delta_e`; 0 when there are no rows.
pub fn picker_score(rows: &[PickerScoreRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|row| row.mean_delta_e).sum::<f64>() / rows.len() as f64
}

/// Case-insensitive first; among texts equal up to case, lowercase sorts
/// before uppercase (`a` before `A`), as a locale-aware collation orders them.
fn compare_stimulus(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PickerKind, PickerTrial};

    fn colored(stimulus: &str, repeat: u32, hex: &str) -> PickerResponse {
        let trial = PickerTrial::new(PickerKind::Grapheme, stimulus, repeat);
        PickerResponse::with_color(&trial, 0, 0, hex).unwrap()
    }

    #[test]
    fn out_of_range_repeats_are_dropped() {
        let mut negative = colored("A", 0, "#ff0000");
        negative.repeat_index = -1;
        let rows = score_picker_rows(&[negative, colored("A", 5, "#00ff00")], 3);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].repeats_rgb, vec![None, None, None]);
        assert_eq!(rows[0].mean_delta_e, 0.0);
    }

    #[test]
    fn malformed_hex_counts_as_no_color() {
        let mut broken = colored("A", 1, "#ff0000");
        broken.hex = Some("not-a-color".into());
        let rows = score_picker_rows(&[colored("A", 0, "#ff0000"), broken], 2);
        assert_eq!(rows[0].repeats_rgb, vec![Some(Rgb::new(255, 0, 0)), None]);
    }

    #[test]
    fn rgb_is_used_when_hex_is_absent() {
        let mut rgb_only = colored("A", 0, "#00ff00");
        rgb_only.hex = None;
        let rows = score_picker_rows(&[rgb_only], 1);
        assert_eq!(rows[0].repeats_rgb, vec![Some(Rgb::new(0, 255, 0))]);
    }

    #[test]
    fn mean_over_three_colors_uses_all_pairs() {
        let colors = [
            Some(Rgb::new(255, 0, 0)),
            Some(Rgb::new(0, 255, 0)),
            Some(Rgb::new(0, 0, 255)),
        ];
        let labs: Vec<_> = colors.iter().flatten().map(|c| rgb_to_lab(*c)).collect();
        let expected = (delta_e76(labs[0], labs[1])
            + delta_e76(labs[0], labs[2])
            + delta_e76(labs[1], labs[2]))
            / 3.0;
        assert!((mean_pairwise_delta_e(&colors) - expected).abs() < 1e-9);
    }

    #[test]
    fn rows_sort_case_insensitively() {
        let rows = score_picker_rows(
            &[
                colored("b", 0, "#000000"),
                colored("Monday", 0, "#000000"),
                colored("A", 0, "#000000"),
                colored("a", 0, "#000000"),
            ],
            1,
        );
        let order: Vec<_> = rows.iter().map(|r| r.stimulus_text.as_str()).collect();
        assert_eq!(order, vec!["a", "A", "b", "Monday"]);
    }
}
