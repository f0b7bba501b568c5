/*!
 * Tests for configuration persistence and overrides
 */

use anyhow::Result;

use subctx::app_config::{Config, LogLevel};
use subctx::model_limits::{MatchType, ModelTokenLimits, TokenLimitRule};
use subctx::providers::{CacheMode, RetryMode};
use subctx::translation::TruncationMode;
use crate::common;

#[test]
fn test_load_handWrittenFile_shouldApplyValuesAndDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "config.json",
        r#"{
            "api_key": "sk-abc",
            "selected_model": "gpt-4o-mini",
            "retry_mode": 2,
            "context_truncation_mode": "smart_trim",
            "context_cache_mode": "off",
            "log_level": "debug",
            "model_token_limits": {"rules": [{"type": "prefix", "value": "gpt-4o", "tokens": 64000}]}
        }"#,
    )?;

    let config = Config::load(&path)?;

    assert_eq!(config.api_key, "sk-abc");
    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(config.retry_mode, RetryMode::RetryForever);
    assert_eq!(config.context_truncation_mode, TruncationMode::SmartTrim);
    assert_eq!(config.context_cache_mode, CacheMode::Off);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.api_url, "https://api.openai.com/v1/chat/completions");
    assert_eq!(config.model_token_limits.default, 4096);
    assert_eq!(config.max_model_tokens(), 64000);
    Ok(())
}

#[test]
fn test_load_invalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "config.json", "{ not json")?;

    assert!(Config::load(&path).is_err());
    Ok(())
}

#[test]
fn test_load_outOfRangeRetryMode_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "config.json", r#"{"retry_mode": 9}"#)?;

    assert!(Config::load(&path).is_err());
    Ok(())
}

#[test]
fn test_configure_loginThenSave_shouldPersist() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("subctx").join("config.json");

    let mut config = Config::load(&path)?;
    config.update_from_login_string("llama3|http://localhost:11434/v1/chat/completions|nullkey|3000|3");
    config.save(&path)?;

    let reloaded = Config::load(&path)?;
    assert_eq!(reloaded.model, "llama3");
    assert_eq!(reloaded.delay_ms, 3000);
    assert_eq!(reloaded.retry_mode, RetryMode::DelayEveryAttempt);
    assert_eq!(reloaded.max_model_tokens(), 4096);
    Ok(())
}

#[test]
fn test_modelTokenLimits_customRulesInOrder_shouldPreferFirst() {
    let limits = ModelTokenLimits {
        default: 2048,
        rules: vec![
            TokenLimitRule::new(MatchType::Contains, "mini", 16000),
            TokenLimitRule::new(MatchType::Prefix, "gpt-4o", 128000),
        ],
    };

    assert_eq!(limits.max_tokens_for("gpt-4o-mini"), 16000);
    assert_eq!(limits.max_tokens_for("gpt-4o"), 128000);
    assert_eq!(limits.max_tokens_for(""), 2048);
}

#[test]
fn test_validate_sourceLanguage_shouldAcceptEmptyAndRejectUnknown() {
    let mut config = Config::default();
    config.source_language = String::new();
    assert!(config.validate().is_ok());

    config.source_language = "klingon".to_string();
    assert!(config.validate().is_err());
}
