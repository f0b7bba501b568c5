/*!
 * Token-budgeted context window.
 *
 * Selects which prior subtitle lines travel with a translation request:
 * - Walks the history newest-to-oldest so recent dialogue wins the budget
 * - Emits segments oldest-to-newest by inserting at the front
 * - Either drops what no longer fits or keeps a trailing slice of it
 */

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::history::SubtitleHistory;
use super::tokens::{CHARS_PER_TOKEN, estimate_token_count};

/// Headroom kept free for the model's own response
pub const RESPONSE_RESERVE_TOKENS: usize = 1000;

/// What to do with the first history entry that does not fit the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationMode {
    /// Stop at the first entry that does not fit
    #[default]
    DropOldest,
    /// Keep the tail of the entry that overflows, then stop
    SmartTrim,
}

impl fmt::Display for TruncationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DropOldest => write!(f, "drop_oldest"),
            Self::SmartTrim => write!(f, "smart_trim"),
        }
    }
}

impl FromStr for TruncationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop_oldest" => Ok(Self::DropOldest),
            "smart_trim" => Ok(Self::SmartTrim),
            other => Err(format!("unknown truncation mode: {}", other)),
        }
    }
}

/// Context selection policy for one translation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow {
    /// Ceiling on context tokens attached to a request
    pub token_budget: usize,

    /// Overflow policy
    pub truncation_mode: TruncationMode,
}

impl ContextWindow {
    pub fn new(token_budget: usize, truncation_mode: TruncationMode) -> Self {
        Self {
            token_budget,
            truncation_mode,
        }
    }

    /// Tokens available for context once the reserve and the current line are paid for.
    ///
    /// Models whose ceiling is below the reserve keep their full ceiling.
    pub fn available_tokens(&self, current_text: &str, max_model_tokens: usize) -> usize {
        let current_tokens = estimate_token_count(current_text);
        let safe_budget = max_model_tokens
            .checked_sub(RESPONSE_RESERVE_TOKENS)
            .unwrap_or(max_model_tokens);
        self.token_budget.min(safe_budget.saturating_sub(current_tokens))
    }

    /// Choose the context segments for `current_text`, oldest first.
    pub fn build_segments(
        &self,
        history: &SubtitleHistory,
        current_text: &str,
        max_model_tokens: usize,
    ) -> Vec<String> {
        let available = self.available_tokens(current_text, max_model_tokens);

        let mut segments: VecDeque<String> = VecDeque::new();
        let mut used_tokens = 0usize;

        for subtitle in history.iter_recent() {
            let tokens = estimate_token_count(subtitle);
            if tokens == 0 {
                continue;
            }

            if used_tokens + tokens <= available {
                segments.push_front(subtitle.to_string());
                used_tokens += tokens;
                continue;
            }

            if self.truncation_mode == TruncationMode::SmartTrim && available > used_tokens {
                let char_budget = (available - used_tokens) * CHARS_PER_TOKEN;
                segments.push_front(trailing_chars(subtitle, char_budget).to_string());
            }
            break;
        }

        debug!(
            "Context window: {} segment(s), {}/{} tokens",
            segments.len(),
            used_tokens,
            available
        );

        segments.into()
    }

    /// Number of history entries kept between requests for this budget.
    pub fn history_retention(&self) -> usize {
        let history_target = (self.token_budget / 16).clamp(96, 2048);
        let mut shrink_target = history_target.saturating_sub(64);
        if shrink_target < 64 {
            shrink_target = history_target / 2;
        }
        shrink_target.max(32)
    }

    /// Prune the history so it stays bounded over a long session.
    pub fn shrink_history(&self, history: &mut SubtitleHistory) {
        history.shrink(self.history_retention());
    }
}

/// Last `count` characters of `text`
fn trailing_chars(text: &str, count: usize) -> &str {
    let total = text.chars().count();
    if count >= total {
        return text;
    }
    let start = text
        .char_indices()
        .nth(total - count)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &text[start..]
}
