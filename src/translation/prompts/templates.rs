/*!
 * Prompt templates for subtitle translation.
 *
 * The baseline chat endpoint receives one user message built from
 * `TranslationPromptBuilder`. The caching endpoint receives the same
 * system prompt plus an instruction block and one labelled part per
 * context segment, so that the stable prefix can be cached server-side.
 */

/// Label rendered for an unset language
pub const AUTO_DETECT_LABEL: &str = "Auto Detect";

/// System prompt shared by both endpoints.
pub const SYSTEM_PROMPT: &str = concat!(
    "You are an expert subtitle translate tool with a deep understanding of both language and culture.",
    "Based on contextual clues, you provide translations that capture not only the literal meaning but also the nuanced metaphors,",
    " euphemisms, and cultural symbols embedded in the dialogue.",
    "Your translations reflect the intended tone and cultural context, ensuring that every subtle reference and idiomatic expression",
    " is accurately conveyed.",
    "I will provide you with some context for better translations, but DO NOT output any of them.\n",
    "Rules:\n",
    "1. Output the translation only.\n",
    "2. Do NOT output extra comments or explanations.\n",
    "3. Do NOT use any special characters or formatting in the translation."
);

/// Template with `{source_language}` / `{target_language}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Instruction block sent as a cacheable part to the caching endpoint.
    pub const CACHE_INSTRUCTION: &'static str = "Translate the complete content under 'Subtitle to translate' using the provided context entries if available. \
Each entry is shown as \"Context entry (older to newer): {...}\" and must never appear in the output.\n\n\
Source language: {source_language}\n\
Target language: {target_language}\n\n\
Output only the translated subtitle without extra commentary.";

    /// Header of the baseline user prompt.
    pub const USER_HEADER: &'static str = "Translate the complete content under the section 'Subtitle to translate' based on the section 'Subtitle context', if it exists.\n\n\
Source language: {source_language}\n\
Target language: {target_language}\n\n";

    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn cache_instruction() -> Self {
        Self::new(Self::CACHE_INSTRUCTION)
    }

    /// Render the template with the given language labels.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

/// Builder for the baseline user prompt.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder<'a> {
    source_label: &'a str,
    target_label: &'a str,
    context_segments: &'a [String],
}

impl<'a> TranslationPromptBuilder<'a> {
    pub fn new(source_label: &'a str, target_label: &'a str) -> Self {
        Self {
            source_label,
            target_label,
            context_segments: &[],
        }
    }

    /// Attach prior dialogue, oldest first.
    pub fn with_context(mut self, segments: &'a [String]) -> Self {
        self.context_segments = segments;
        self
    }

    /// Render the prompt for `subtitle`. The context section is omitted when
    /// there are no segments.
    pub fn build(&self, subtitle: &str) -> String {
        let mut prompt =
            PromptTemplate::new(PromptTemplate::USER_HEADER).render(self.source_label, self.target_label);

        if !self.context_segments.is_empty() {
            prompt.push_str("[Subtitle context](DO NOT OUTPUT!):\n{");
            prompt.push_str(&self.context_segments.join("\n"));
            prompt.push_str("}\n\n");
        }

        prompt.push_str("[Subtitle to translate]:\n{");
        prompt.push_str(subtitle);
        prompt.push('}');
        prompt
    }
}

/// Display label for a configured language code.
pub fn language_label(code: &str) -> &str {
    if code.is_empty() { AUTO_DETECT_LABEL } else { code }
}

/// Text of one labelled context part for the caching endpoint
pub fn context_entry_text(segment: &str) -> String {
    format!("Context entry (older to newer): {{{}}}", segment)
}

/// Text of the final, uncached part for the caching endpoint
pub fn subtitle_part_text(subtitle: &str) -> String {
    format!("Subtitle to translate: {{{}}}", subtitle)
}
