//! Turning a free-text relevance judgement into candidate indices.
//!
//! The judge is asked for 1-based document numbers such as `"3,1,5"` but
//! answers are often wrapped in prose. Every run of ASCII, Arabic-Indic or
//! Persian digits is read as a number, so `"note: 3, 1, 1, 9"` yields
//! `[2, 0, 0, 8]`. Digits of other scripts separate runs like any other text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::types::RetrievedDocument;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9\x{0660}-\x{0669}\x{06F0}-\x{06F9}]+").expect("valid regex")
});

/// Value of a decimal digit in the scripts a judge is likely to answer in.
fn digit_value(c: char) -> Option<usize> {
    match c {
        '0'..='9' => Some(c as usize - '0' as usize),
        // Arabic-Indic
        '\u{0660}'..='\u{0669}' => Some(c as usize - 0x0660),
        // Extended Arabic-Indic (Persian)
        '\u{06F0}'..='\u{06F9}' => Some(c as usize - 0x06F0),
        _ => None,
    }
}

fn parse_run(run: &str) -> Option<usize> {
    run.chars().try_fold(0usize, |acc, c| {
        let digit = digit_value(c)?;
        acc.checked_mul(10)?.checked_add(digit)
    })
}

/// Extract 0-based candidate indices from a judgement.
///
/// Order and duplicates are preserved. Numbers that are zero, overflow,
/// or exceed `candidate_count` are dropped. An empty result means the
/// judgement was unusable.
pub fn parse_rerank_indices(response: &str, candidate_count: usize) -> Vec<usize> {
    DIGIT_RUN
        .find_iter(response)
        .filter_map(|m| parse_run(m.as_str()))
        .filter_map(|n| n.checked_sub(1))
        .filter(|&idx| idx < candidate_count)
        .collect()
}

/// Pick candidates by index, keeping the first occurrence of each and at
/// most `top_n` in total. Out-of-range indices are ignored.
pub fn select_by_indices(
    candidates: &[RetrievedDocument],
    indices: &[usize],
    top_n: usize,
) -> Vec<RetrievedDocument> {
    let mut seen = HashSet::new();
    indices
        .iter()
        .copied()
        .filter(|&idx| idx < candidates.len() && seen.insert(idx))
        .take(top_n)
        .map(|idx| candidates[idx].clone())
        .collect()
}

/// The naive selection used whenever re-ranking is skipped or fails.
pub fn first_n(candidates: &[RetrievedDocument], top_n: usize) -> Vec<RetrievedDocument> {
    candidates.iter().take(top_n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> Vec<RetrievedDocument> {
        (0..n)
            .map(|i| RetrievedDocument::new(format!("c{}", i), format!("text {}", i), "src"))
            .collect()
    }

    #[test]
    fn test_prose_wrapped_indices() {
        assert_eq!(parse_rerank_indices("note: 3, 1, 1, 9", 10), vec![2, 0, 0, 8]);
    }

    #[test]
    fn test_plain_list() {
        assert_eq!(parse_rerank_indices("3,1,5", 10), vec![2, 0, 4]);
    }

    #[test]
    fn test_out_of_range_and_zero_are_dropped() {
        assert_eq!(parse_rerank_indices("0, 4, 11, 2", 4), vec![3, 1]);
        assert!(parse_rerank_indices("99999999999999999999999", 10).is_empty());
    }

    #[test]
    fn test_no_digits_is_empty() {
        assert!(parse_rerank_indices("I cannot determine relevance", 10).is_empty());
        assert!(parse_rerank_indices("", 10).is_empty());
    }

    #[test]
    fn test_persian_digits() {
        assert_eq!(parse_rerank_indices("سند ۳ و ۱", 5), vec![2, 0]);
        assert_eq!(parse_rerank_indices("٢,١", 5), vec![1, 0]);
    }

    #[test]
    fn test_other_script_digits_do_not_swallow_a_run() {
        // Devanagari three splits the run instead of voiding it.
        assert_eq!(parse_rerank_indices("3\u{0969}", 5), vec![2]);
        assert_eq!(parse_rerank_indices("\u{0969}, 2", 5), vec![1]);
    }

    #[test]
    fn test_bounds_hold_for_any_count() {
        let response = "7 2 15 3 0 1 8 22 4";
        for count in 0..12 {
            for idx in parse_rerank_indices(response, count) {
                assert!(idx < count);
            }
        }
    }

    #[test]
    fn test_selection_dedupes_and_caps() {
        let docs = candidates(10);
        let selected = select_by_indices(&docs, &[2, 0, 0, 8], 3);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0], docs[2]);
        assert_eq!(selected[1], docs[0]);
        assert_eq!(selected[2], docs[8]);
    }

    #[test]
    fn test_selection_of_nothing_is_empty() {
        let docs = candidates(4);
        assert!(select_by_indices(&docs, &[], 3).is_empty());
        assert!(select_by_indices(&docs, &[9], 3).is_empty());
    }

    #[test]
    fn test_first_n_preserves_order() {
        let docs = candidates(5);
        assert_eq!(first_n(&docs, 3), docs[..3].to_vec());
        assert_eq!(first_n(&docs[..2], 3), docs[..2].to_vec());
    }
}
