/*!
 * Context management for subtitle translation.
 *
 * This module provides context-aware translation support:
 * - Token estimation for budget math
 * - Session history of previously submitted lines
 * - Token-budgeted context window selection
 */

pub mod history;
pub mod tokens;
pub mod window;

// Re-export main types
pub use history::SubtitleHistory;
pub use tokens::estimate_token_count;
pub use window::{ContextWindow, TruncationMode};
