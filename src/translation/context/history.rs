/*!
 * Dialogue history for contextual translation.
 *
 * Holds the source lines submitted during one session, oldest first.
 * The translator appends each line before building its context window
 * and prunes from the front afterwards.
 */

use std::collections::VecDeque;

/// Recent subtitle lines, in chronological order.
#[derive(Debug, Clone, Default)]
pub struct SubtitleHistory {
    entries: VecDeque<String>,
}

impl SubtitleHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line. Empty lines are ignored.
    pub fn add(&mut self, subtitle: impl Into<String>) {
        let subtitle = subtitle.into();
        if !subtitle.is_empty() {
            self.entries.push_back(subtitle);
        }
    }

    /// Drop the oldest entries until at most `target` remain.
    pub fn shrink(&mut self, target: usize) {
        while self.entries.len() > target {
            self.entries.pop_front();
        }
    }

    /// Prior entries, newest first, excluding the line currently being translated.
    ///
    /// Yields nothing when fewer than two entries exist. Each call starts a
    /// fresh walk over the history.
    pub fn iter_recent(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().rev().skip(1).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }
}
