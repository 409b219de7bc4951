//! Speed and accuracy scoring.
//!
//! [`sample`] is a pure function of the target, the typed buffer, the
//! elapsed session time and the error count. It keeps no timer state, the
//! caller decides when to invoke it.

use serde::Serialize;

/// Characters per word, the usual typing-test convention.
pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CharacterCounts {
    pub correct: usize,
    pub incorrect: usize,
    pub extra: usize,
    pub missed: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub wpm: u32,
    /// Same value as `wpm`: no separate gross length is tracked.
    pub raw_wpm: u32,
    /// Percentage in `[0, 100]`.
    pub accuracy: f64,
    pub counts: CharacterCounts,
}

pub fn words_per_minute(typed_chars: usize, minutes: f64) -> u32 {
    let words = typed_chars as f64 / CHARS_PER_WORD;
    (words / minutes).round() as u32
}

pub fn correct_chars(target: &[char], buffer: &[char]) -> usize {
    buffer
        .iter()
        .zip(target.iter())
        .filter(|(typed, expected)| typed == expected)
        .count()
}

/// Accuracy over everything typed plus every historical miss, so corrected
/// mistakes still count against it.
pub fn accuracy(correct: usize, typed: usize, errors: u32) -> f64 {
    if typed == 0 {
        return 0.0;
    }
    correct as f64 / (typed as f64 + errors as f64) * 100.0
}

pub fn character_counts(target: &[char], buffer: &[char]) -> CharacterCounts {
    let correct = correct_chars(target, buffer);
    CharacterCounts {
        correct,
        incorrect: buffer.len() - correct,
        extra: buffer.len().saturating_sub(target.len()),
        missed: target.len().saturating_sub(buffer.len()),
    }
}

/// Compute a snapshot, or `None` when no time has elapsed yet.
pub fn sample(
    target: &[char],
    buffer: &[char],
    seconds_elapsed: f64,
    errors: u32,
) -> Option<StatsSnapshot> {
    let minutes = seconds_elapsed / 60.0;
    if minutes.is_nan() || minutes <= 0.0 {
        return None;
    }

    let wpm = words_per_minute(buffer.len(), minutes);
    let counts = character_counts(target, buffer);

    Some(StatsSnapshot {
        wpm,
        raw_wpm: wpm,
        accuracy: accuracy(counts.correct, buffer.len(), errors),
        counts,
    })
}

/// True only when the buffer matches the target exactly.
pub fn is_complete(target: &[char], buffer: &[char]) -> bool {
    target == buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn no_snapshot_without_elapsed_time() {
        assert_eq!(sample(&chars("ab"), &[], 0.0, 0), None);
        assert_eq!(sample(&chars("ab"), &chars("a"), -3.0, 0), None);
        assert_eq!(sample(&chars("ab"), &chars("a"), f64::NAN, 0), None);
    }

    #[test]
    fn wpm_uses_five_chars_per_word() {
        let buffer = vec!['a'; 50];
        let snap = sample(&buffer, &buffer, 30.0, 0).unwrap();
        assert_eq!(snap.wpm, 20);
        assert_eq!(snap.raw_wpm, 20);
    }

    #[test]
    fn wpm_rounds_to_nearest() {
        // 7 chars in 60s = 1.4 words/min
        assert_eq!(words_per_minute(7, 1.0), 1);
        // 8 chars in 60s = 1.6 words/min
        assert_eq!(words_per_minute(8, 1.0), 2);
    }

    #[test]
    fn accuracy_counts_historical_errors() {
        let snap = sample(&chars("hello"), &chars("helLo"), 10.0, 1).unwrap();
        assert_eq!(snap.counts.correct, 4);
        assert_eq!(snap.counts.incorrect, 1);
        assert!((snap.accuracy - 66.67).abs() < 0.01);
    }

    #[test]
    fn accuracy_is_zero_for_empty_buffer() {
        let snap = sample(&chars("hello"), &[], 5.0, 3).unwrap();
        assert_eq!(snap.accuracy, 0.0);
        assert_eq!(snap.wpm, 0);
        assert_eq!(snap.counts.missed, 5);
    }

    #[test]
    fn perfect_run_is_full_accuracy() {
        let target = chars("let x = 1;");
        let snap = sample(&target, &target, 12.0, 0).unwrap();
        assert_eq!(snap.accuracy, 100.0);
        assert_eq!(snap.counts, CharacterCounts {
            correct: 10,
            incorrect: 0,
            extra: 0,
            missed: 0,
        });
    }

    #[test]
    fn extra_and_missed_counts() {
        let counts = character_counts(&chars("abc"), &chars("abcde"));
        assert_eq!(counts.extra, 2);
        assert_eq!(counts.missed, 0);
        assert_eq!(counts.incorrect, 2);

        let counts = character_counts(&chars("abcde"), &chars("ab"));
        assert_eq!(counts.extra, 0);
        assert_eq!(counts.missed, 3);
    }

    #[test]
    fn completion_requires_exact_match() {
        assert!(is_complete(&chars("abc"), &chars("abc")));
        assert!(!is_complete(&chars("abc"), &chars("abd")));
        assert!(!is_complete(&chars("abc"), &chars("ab")));
        assert!(!is_complete(&chars("abc"), &chars("abcd")));
    }
}
