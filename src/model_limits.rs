/*!
 * Model token ceilings.
 *
 * The ceiling for the configured model is resolved from an ordered rule
 * list stored in the config file. The first rule that matches wins, so more
 * specific rules must come before broader ones to take effect.
 */

use serde::{Deserialize, Serialize};

/// Ceiling used when no rule matches
pub const DEFAULT_MODEL_TOKENS: usize = 4096;

/// How a rule's `value` is compared with the model name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Prefix,
    Contains,
    Equals,
    /// Any other type string; never matches
    #[serde(other)]
    Unknown,
}

/// One `{type, value, tokens}` rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLimitRule {
    #[serde(rename = "type")]
    pub match_type: MatchType,

    #[serde(default)]
    pub value: String,

    #[serde(default)]
    pub tokens: usize,
}

impl TokenLimitRule {
    pub fn new(match_type: MatchType, value: impl Into<String>, tokens: usize) -> Self {
        Self {
            match_type,
            value: value.into(),
            tokens,
        }
    }

    fn matches(&self, model: &str) -> bool {
        match self.match_type {
            MatchType::Prefix => model.starts_with(&self.value),
            MatchType::Contains => model.contains(&self.value),
            MatchType::Equals => model == self.value,
            MatchType::Unknown => false,
        }
    }
}

/// Default ceiling plus ordered override rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTokenLimits {
    #[serde(default = "default_tokens")]
    pub default: usize,

    #[serde(default)]
    pub rules: Vec<TokenLimitRule>,
}

fn default_tokens() -> usize {
    DEFAULT_MODEL_TOKENS
}

impl Default for ModelTokenLimits {
    fn default() -> Self {
        Self {
            default: DEFAULT_MODEL_TOKENS,
            rules: vec![
                TokenLimitRule::new(MatchType::Contains, "gpt-4", 8192),
                TokenLimitRule::new(MatchType::Contains, "gpt-4o", 128000),
                TokenLimitRule::new(MatchType::Contains, "gpt-4.1", 128000),
                TokenLimitRule::new(MatchType::Contains, "gpt-4o-mini", 128000),
                TokenLimitRule::new(MatchType::Contains, "gpt-5", 128000),
                TokenLimitRule::new(MatchType::Contains, "o1", 128000),
                TokenLimitRule::new(MatchType::Contains, "gemini", 122880),
            ],
        }
    }
}

impl ModelTokenLimits {
    /// Token ceiling for `model`.
    ///
    /// Rules with an empty value or zero tokens are ignored. A blank model
    /// name gets the default.
    pub fn max_tokens_for(&self, model: &str) -> usize {
        let model = model.trim();
        if model.is_empty() {
            return self.default;
        }

        self.rules
            .iter()
            .filter(|rule| rule.tokens > 0 && !rule.value.is_empty())
            .find(|rule| rule.matches(model))
            .map(|rule| rule.tokens)
            .unwrap_or(self.default)
    }
}
