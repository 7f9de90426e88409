/*!
 * Tests for application configuration functionality
 */

use captran::app_config::{Config, LogLevel, TranslationProvider};
use std::time::Duration;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.target_language, "ko");
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.captions.endpoint, "https://www.youtube.com");
    assert!(config.captions.preferred_languages.is_empty());

    let translation = &config.translation;
    assert_eq!(translation.provider, TranslationProvider::Google);
    assert_eq!(translation.max_chunk_chars, 1000);
    assert_eq!(translation.retry_count, 3);
    assert_eq!(translation.concurrent_requests, 4);
    assert_eq!(translation.rate_limit, Some(60));
    assert!(translation.cache_enabled);
    assert_eq!(translation.cache_capacity, 10_000);
    assert_eq!(translation.pipeline_timeout(), None);
    assert_eq!(translation.request_timeout(), Duration::from_secs(30));
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.target_language = "zz".to_string();
    assert!(config.validate().is_err());
    config.target_language = "pt-BR".to_string();
    assert!(config.validate().is_ok());

    config.translation.max_chunk_chars = 0;
    assert!(config.validate().is_err());
    config.translation.max_chunk_chars = 500;

    config.translation.retry_count = 0;
    assert!(config.validate().is_err());
    config.translation.retry_count = 1;

    config.translation.concurrent_requests = 0;
    assert!(config.validate().is_err());
    config.translation.concurrent_requests = 1;

    config.captions.preferred_languages = vec!["en".to_string(), "nope".to_string()];
    assert!(config.validate().is_err());
    config.captions.preferred_languages = vec!["en".to_string()];

    assert!(config.validate().is_ok());
}

#[test]
fn test_config_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "target_language": "ja",
        "translation": { "provider": "mock", "pipeline_timeout_secs": 90, "rate_limit": null }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.target_language, "ja");
    assert_eq!(config.translation.provider, TranslationProvider::Mock);
    assert_eq!(config.translation.pipeline_timeout(), Some(Duration::from_secs(90)));
    assert_eq!(config.translation.rate_limit, None);
    assert_eq!(config.translation.max_chunk_chars, 1000);
    assert_eq!(config.captions.timeout_secs, 30);
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() {
    common::init_test_logging();
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let created = Config::load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(created.target_language, "ko");

    let reloaded = Config::from_file(&path).unwrap();
    assert_eq!(reloaded.translation.retry_count, created.translation.retry_count);
}

#[test]
fn test_load_or_create_withExistingFile_shouldReadIt() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{"target_language": "en", "log_level": "debug"}"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();
    assert_eq!(config.target_language, "en");
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn test_from_file_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();
    let error = Config::from_file(&path).unwrap_err();
    assert!(error.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_save_thenLoad_shouldRoundTrip() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("saved.json");

    let mut config = common::test_config();
    config.target_language = "fr".to_string();
    config.captions.preferred_languages = vec!["en".to_string()];
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.target_language, "fr");
    assert_eq!(loaded.translation.provider, TranslationProvider::Mock);
    assert_eq!(loaded.captions.preferred_languages, vec!["en".to_string()]);
}

#[test]
fn test_translation_provider_fromStr_shouldParseKnownNames() {
    assert_eq!("google".parse::<TranslationProvider>().unwrap(), TranslationProvider::Google);
    assert_eq!("MOCK".parse::<TranslationProvider>().unwrap(), TranslationProvider::Mock);
    assert!("deepl".parse::<TranslationProvider>().is_err());
    assert_eq!(TranslationProvider::Google.to_string(), "google");
    assert_eq!(TranslationProvider::Google.display_name(), "Google Translate");
}
