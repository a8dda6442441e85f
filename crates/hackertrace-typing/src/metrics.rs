//! Character comparison, accuracy, and words-per-minute.

use std::collections::BTreeMap;

/// Stand-in key for mismatches typed past the end of the prompt.
pub const MISSING_CHAR: char = '_';

/// Characters per "word" in WPM arithmetic.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Smallest elapsed time used in WPM arithmetic, in minutes.
pub const MIN_ELAPSED_MINUTES: f64 = 0.001;

/// Comparison of typed text against a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub correct: usize,
    pub incorrect: usize,
    /// Percentage, 0-100. Zero when nothing was typed.
    pub accuracy: f64,
    /// Expected character -> mismatch count.
    pub mistakes: BTreeMap<char, u32>,
}

/// Compare `typed` to `prompt` position by position.
///
/// Only positions that have been typed are compared; the untyped tail of
/// the prompt is not counted against the typist.
pub fn compute_metrics(prompt: &str, typed: &str) -> Metrics {
    let mut expected = prompt.chars();
    let mut correct = 0;
    let mut incorrect = 0;
    let mut mistakes = BTreeMap::new();

    for got in typed.chars() {
        match expected.next() {
            Some(want) if want == got => correct += 1,
            want => {
                incorrect += 1;
                *mistakes.entry(want.unwrap_or(MISSING_CHAR)).or_insert(0) += 1;
            },
        }
    }

    let compared = correct + incorrect;
    let accuracy = if compared == 0 {
        0.0
    } else {
        correct as f64 / compared as f64 * 100.0
    };
    Metrics {
        correct,
        incorrect,
        accuracy,
        mistakes,
    }
}

/// Words per minute for `characters` typed over `elapsed_ms`.
pub fn to_wpm(characters: usize, elapsed_ms: u64) -> f64 {
    let words = characters as f64 / CHARS_PER_WORD;
    let minutes = (elapsed_ms as f64 / 1000.0 / 60.0).max(MIN_ELAPSED_MINUTES);
    words / minutes
}

/// The `n` most frequent mistakes, highest count first.
pub fn top_mistakes(mistakes: &BTreeMap<char, u32>, n: usize) -> Vec<(char, u32)> {
    let mut entries: Vec<(char, u32)> = mistakes.iter().map(|(c, n)| (*c, *n)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_match() {
        let m = compute_metrics("hello", "hello");
        assert_eq!(m.correct, 5);
        assert_eq!(m.incorrect, 0);
        assert_eq!(m.accuracy, 100.0);
        assert!(m.mistakes.is_empty());
    }

    #[test]
    fn one_substitution() {
        let m = compute_metrics("hello", "hxllo");
        assert_eq!(m.correct, 4);
        assert_eq!(m.incorrect, 1);
        assert_eq!(m.accuracy, 80.0);
        assert_eq!(m.mistakes, BTreeMap::from([('e', 1)]));
    }

    #[test]
    fn nothing_typed() {
        let m = compute_metrics("abc", "");
        assert_eq!(m.correct, 0);
        assert_eq!(m.incorrect, 0);
        assert_eq!(m.accuracy, 0.0);
    }

    #[test]
    fn untyped_tail_not_counted() {
        let m = compute_metrics("hello world", "hel");
        assert_eq!(m.correct, 3);
        assert_eq!(m.incorrect, 0);
        assert_eq!(m.accuracy, 100.0);
    }

    #[test]
    fn overflow_uses_sentinel() {
        let m = compute_metrics("ab", "abcd");
        assert_eq!(m.correct, 2);
        assert_eq!(m.incorrect, 2);
        assert_eq!(m.mistakes, BTreeMap::from([(MISSING_CHAR, 2)]));
    }

    #[test]
    fn mistakes_keyed_by_expected_char() {
        let m = compute_metrics("aaa b", "xyz_b");
        assert_eq!(m.mistakes.get(&'a'), Some(&3));
        assert_eq!(m.mistakes.get(&' '), Some(&1));
    }

    #[test]
    fn wpm_one_minute() {
        assert_eq!(to_wpm(25, 60_000), 5.0);
    }

    #[test]
    fn wpm_zero_elapsed_is_finite() {
        let w = to_wpm(5, 0);
        assert!(w.is_finite());
        assert_eq!(w, 1.0 / MIN_ELAPSED_MINUTES);
        assert_eq!(to_wpm(0, 0), 0.0);
    }

    #[test]
    fn top_mistakes_sorted() {
        let m = BTreeMap::from([('a', 1), ('b', 5), ('c', 3), ('d', 3)]);
        assert_eq!(top_mistakes(&m, 3), vec![('b', 5), ('c', 3), ('d', 3)]);
        assert!(top_mistakes(&BTreeMap::new(), 10).is_empty());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn counts_cover_typed_length(prompt in "[a-z ]{0,40}", typed in "[a-z ]{0,40}") {
                let m = compute_metrics(&prompt, &typed);
                prop_assert_eq!(m.correct + m.incorrect, typed.chars().count());
                let total: u32 = m.mistakes.values().sum();
                prop_assert_eq!(total as usize, m.incorrect);
                prop_assert!((0.0..=100.0).contains(&m.accuracy));
            }

            #[test]
            fn typing_the_prompt_prefix_is_perfect(prompt in "[a-z ]{1,40}", cut in 0usize..40) {
                let cut = cut.min(prompt.len());
                let m = compute_metrics(&prompt, &prompt[..cut]);
                prop_assert_eq!(m.incorrect, 0);
                prop_assert_eq!(m.correct, cut);
            }
        }
    }
}
