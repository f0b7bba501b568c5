/*!
 * Prompt construction for subtitle translation.
 *
 * This module provides:
 * - The fixed system prompt
 * - The baseline user prompt with an optional context section
 * - The instruction block and labelled parts used by the caching endpoint
 */

pub mod templates;

// Re-export main types
pub use templates::{
    PromptTemplate, SYSTEM_PROMPT, TranslationPromptBuilder, context_entry_text, language_label,
    subtitle_part_text,
};
