//! Vote aggregation: tallying and the deterministic final-score rule.

use indexmap::IndexMap;

/// Count votes per distinct value, keyed in first-seen order.
///
/// The insertion-ordered map makes every downstream iteration deterministic:
/// two runs over the same vote sequence always visit values the same way.
pub fn tally_votes<'a>(values: impl IntoIterator<Item = &'a str>) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

/// The value holding a strict plurality, if any.
///
/// A value wins only when its count is strictly higher than every other
/// value's; a tie for the top count yields no winner. This replaces any
/// reliance on accidental iteration order for equal counts.
pub fn plurality_winner(counts: &IndexMap<String, usize>) -> Option<&str> {
    let mut winner: Option<(&str, usize)> = None;
    let mut tied = false;

    for (value, &count) in counts {
        match winner {
            Some((_, best)) if count > best => {
                winner = Some((value, count));
                tied = false;
            }
            Some((_, best)) if count == best => tied = true,
            Some(_) => {}
            None => winner = Some((value, count)),
        }
    }

    match (winner, tied) {
        (Some((value, _)), false) => Some(value),
        _ => None,
    }
}

/// Compute the final score for a completed story.
///
/// The strict-plurality value wins when it parses as a number. Otherwise —
/// non-numeric winner, or no winner at all — the score falls back to the
/// arithmetic mean of every numeric vote. With no votes, or no numeric votes
/// to average, there is no score.
pub fn final_score(values: &[String]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let counts = tally_votes(values.iter().map(String::as_str));
    if let Some(winner) = plurality_winner(&counts) {
        if let Ok(score) = winner.parse::<f64>() {
            return Some(score);
        }
    }

    let numeric: Vec<f64> = values
        .iter()
        .filter_map(|value| value.parse::<f64>().ok())
        .collect();
    if numeric.is_empty() {
        return None;
    }
    Some(numeric.iter().sum::<f64>() / numeric.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn unanimous_numeric_vote_wins() {
        assert_eq!(final_score(&votes(&["5", "5", "5"])), Some(5.0));
    }

    #[test]
    fn numeric_majority_wins_over_outlier() {
        assert_eq!(final_score(&votes(&["3", "3", "5"])), Some(3.0));
    }

    #[test]
    fn non_numeric_majority_without_numeric_votes_has_no_score() {
        assert_eq!(final_score(&votes(&["XS", "XS", "M"])), None);
    }

    #[test]
    fn tie_falls_back_to_numeric_mean() {
        assert_eq!(final_score(&votes(&["1", "3"])), Some(2.0));
    }

    #[test]
    fn non_numeric_winner_falls_back_to_mean_of_numeric_votes() {
        // "?" wins the tally but cannot score; the numeric votes average out.
        assert_eq!(final_score(&votes(&["?", "?", "2", "4"])), Some(3.0));
    }

    #[test]
    fn no_votes_no_score() {
        assert_eq!(final_score(&[]), None);
    }

    #[test]
    fn three_way_tie_over_numeric_values_averages_all() {
        assert_eq!(final_score(&votes(&["1", "2", "3"])), Some(2.0));
    }

    #[test]
    fn decimal_cards_are_numeric() {
        assert_eq!(final_score(&votes(&["0.5", "0.5", "2"])), Some(0.5));
    }

    #[test]
    fn tally_preserves_first_seen_order() {
        let counts = tally_votes(["8", "3", "8", "1"]);
        let keys: Vec<_> = counts.keys().cloned().collect();
        assert_eq!(keys, vec!["8", "3", "1"]);
        assert_eq!(counts["8"], 2);
    }

    #[test]
    fn plurality_requires_strictly_higher_count() {
        let counts = tally_votes(["5", "5", "8", "8", "3"]);
        assert_eq!(plurality_winner(&counts), None);

        let counts = tally_votes(["5", "5", "8"]);
        assert_eq!(plurality_winner(&counts), Some("5"));
    }
}
