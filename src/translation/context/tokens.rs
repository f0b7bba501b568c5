/*!
 * Token estimation for context budgeting.
 *
 * Uses the characters-divided-by-four heuristic. Budget math downstream
 * tolerates both over- and under-estimation, so no real tokenizer is needed.
 */

/// Number of characters assumed per token
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the number of tokens in `text`.
///
/// Returns `floor(chars / 4)`; empty text yields 0.
pub fn estimate_token_count(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN
}
