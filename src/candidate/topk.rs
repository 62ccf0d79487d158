//! Top-K ranking of scored candidates.

use crate::matcher::ScoreEntry;
use std::cmp::Ordering;

/// Orders by descending score with NaN last; ties keep insertion order.
fn entry_cmp_desc(a: &(usize, &ScoreEntry), b: &(usize, &ScoreEntry)) -> Ordering {
    a.1.score
        .is_nan()
        .cmp(&b.1.score.is_nan())
        .then_with(|| b.1.score.total_cmp(&a.1.score))
        .then_with(|| a.0.cmp(&b.0))
}

/// Returns the `k` best entries sorted by descending score.
pub(crate) fn top_k(entries: &[ScoreEntry], k: usize) -> Vec<ScoreEntry> {
    if k == 0 {
        return Vec::new();
    }
    let mut indexed: Vec<(usize, &ScoreEntry)> = entries.iter().enumerate().collect();
    indexed.sort_by(entry_cmp_desc);
    indexed
        .into_iter()
        .take(k)
        .map(|(_, entry)| entry.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::top_k;
    use crate::matcher::ScoreEntry;

    fn entry(name: &str, score: f64) -> ScoreEntry {
        ScoreEntry {
            identity: name.to_owned(),
            score,
        }
    }

    #[test]
    fn keeps_best_in_descending_order() {
        let entries = [entry("a", 1.0), entry("b", 5.0), entry("c", 3.0), entry("d", 4.0)];
        let names: Vec<_> = top_k(&entries, 3).into_iter().map(|e| e.identity).collect();
        assert_eq!(names, ["b", "d", "c"]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let entries = [entry("a", 2.0), entry("b", 2.0), entry("c", 2.0)];
        let names: Vec<_> = top_k(&entries, 2).into_iter().map(|e| e.identity).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn nan_scores_rank_last() {
        let entries = [entry("nan", f64::NAN), entry("low", -1.0), entry("high", 2.0)];
        let names: Vec<_> = top_k(&entries, 3).into_iter().map(|e| e.identity).collect();
        assert_eq!(names, ["high", "low", "nan"]);
    }

    #[test]
    fn zero_k_is_empty() {
        assert!(top_k(&[entry("a", 1.0)], 0).is_empty());
    }
}
