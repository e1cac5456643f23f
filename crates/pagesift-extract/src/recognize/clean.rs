// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text cleanup and the meaningful-text filter shared by every engine.

/// Collapse all runs of whitespace (including newlines) into single spaces
/// and trim both ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace `|` with `I` and `0` with `O`.
///
/// Only applied when `substitution_cleanup` is enabled: it corrupts genuine
/// digits and pipes, so it is never part of the default path.
pub fn substitute_artifacts(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '|' => 'I',
            '0' => 'O',
            other => other,
        })
        .collect()
}

/// Whether `text` is worth scoring: at least `min_length` characters after
/// trimming, and more than 70% of those characters alphanumeric.
pub fn is_meaningful(text: &str, min_length: usize) -> bool {
    let trimmed = text.trim();
    let total = trimmed.chars().count();
    if total < min_length || total == 0 {
        return false;
    }
    let alphanumeric = trimmed.chars().filter(|c| c.is_alphanumeric()).count();
    alphanumeric as f64 > 0.7 * total as f64
}
