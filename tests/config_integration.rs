//! Configuration loading tests.
//!
//! These tests mutate process environment variables, so they run serially.

use emochat::config::{self, AppConfig};
use serial_test::serial;
use std::env;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    // SAFETY: tests in this file are #[serial]; no other thread reads the
    // environment while these run.
    unsafe {
        env::remove_var("EMOCHAT_SERVER__PORT");
        env::remove_var("EMOCHAT_SERVER__HOST");
        env::remove_var("LLM_BASE_URL");
        env::remove_var("LLM_MODEL");
        env::remove_var("LLM_API_KEY");
        env::remove_var("LLM_MAX_TOKENS");
        env::remove_var("LLM_TEMPERATURE");
        env::remove_var("FACE_API_BASE_URL");
        env::remove_var("FACE_API_KEY");
        env::remove_var("HOST");
        env::remove_var("PORT");
    }
}

fn set_var(key: &str, value: &str) {
    // SAFETY: see clear_env_vars.
    unsafe {
        env::set_var(key, value);
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["emochat"]).expect("Failed to load config");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    set_var("EMOCHAT_SERVER__PORT", "9090");

    let config = AppConfig::load_from_args(["emochat"]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_override_wins() {
    clear_env_vars();
    set_var("EMOCHAT_SERVER__PORT", "9090");

    let config = AppConfig::load_from_args(["emochat", "--port", "8080"])
        .expect("Failed to load config");
    assert_eq!(config.server.port, 8080);

    clear_env_vars();
}

#[test]
#[serial]
fn test_llm_settings_require_api_key() {
    clear_env_vars();
    set_var("LLM_BASE_URL", "https://api.example.com");
    set_var("LLM_MODEL", "gpt-4o-mini");

    let err = config::load_llm_settings().unwrap_err();
    assert!(err.contains("LLM_API_KEY"));

    clear_env_vars();
}

#[test]
#[serial]
fn test_llm_settings_defaults() {
    clear_env_vars();
    set_var("LLM_BASE_URL", "https://api.example.com");
    set_var("LLM_MODEL", "gpt-4o-mini");
    set_var("LLM_API_KEY", "test-key");

    let settings = config::load_llm_settings().expect("Failed to load LLM settings");
    assert_eq!(settings.max_tokens, 100);
    assert!((settings.temperature - 0.7).abs() < f32::EPSILON);

    clear_env_vars();
}

#[test]
#[serial]
fn test_llm_settings_overrides() {
    clear_env_vars();
    set_var("LLM_BASE_URL", "https://api.example.com");
    set_var("LLM_MODEL", "gpt-4o-mini");
    set_var("LLM_API_KEY", "test-key");
    set_var("LLM_MAX_TOKENS", "64");
    set_var("LLM_TEMPERATURE", "0.2");

    let settings = config::load_llm_settings().expect("Failed to load LLM settings");
    assert_eq!(settings.max_tokens, 64);
    assert!((settings.temperature - 0.2).abs() < f32::EPSILON);

    clear_env_vars();
}

#[test]
#[serial]
fn test_face_settings() {
    clear_env_vars();

    assert!(config::load_face_settings().is_err());

    set_var("FACE_API_BASE_URL", "http://localhost:5005");
    let settings = config::load_face_settings().expect("Failed to load face settings");
    assert_eq!(settings.base_url, "http://localhost:5005");
    assert!(settings.api_key.is_none());

    set_var("FACE_API_KEY", "face-key");
    let settings = config::load_face_settings().expect("Failed to load face settings");
    assert_eq!(settings.api_key.as_deref(), Some("face-key"));

    clear_env_vars();
}
