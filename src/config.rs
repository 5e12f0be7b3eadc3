//! Configuration loading.
//!
//! Two layers, as elsewhere in this codebase's lineage: structured server
//! settings through the `config` crate with CLI/env overrides, and plain
//! environment readers for the two external-service credentials. The
//! completion-service key is deliberately required with no built-in default;
//! a deployment that cannot provide one must not start.

use clap::Parser;
use config::{Config, Environment};
use serde::Deserialize;

use crate::emotion::FaceSettings;
use crate::llm::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, LlmSettings};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Host to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?;

        // CLI flags (and their clap-bound env vars) win over everything else.
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        // Environment variables prefixed with EMOCHAT_, e.g. EMOCHAT_SERVER__PORT=8000.
        builder = builder.add_source(
            Environment::with_prefix("EMOCHAT")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}

/// Read completion-service settings from the environment.
pub fn load_llm_settings() -> Result<LlmSettings, String> {
    let base_url = std::env::var("LLM_BASE_URL")
        .map_err(|_| "Missing required env var: LLM_BASE_URL".to_string())?;
    if base_url.trim().is_empty() {
        return Err("LLM_BASE_URL cannot be empty".to_string());
    }

    let model = std::env::var("LLM_MODEL")
        .map_err(|_| "Missing required env var: LLM_MODEL".to_string())?;
    if model.trim().is_empty() {
        return Err("LLM_MODEL cannot be empty".to_string());
    }

    // The key must come from the deployment's secret store. No fallback.
    let api_key = std::env::var("LLM_API_KEY")
        .map_err(|_| "Missing required env var: LLM_API_KEY".to_string())?;
    if api_key.trim().is_empty() {
        return Err("LLM_API_KEY cannot be empty".to_string());
    }

    let max_tokens = match std::env::var("LLM_MAX_TOKENS") {
        Ok(v) => v
            .parse()
            .map_err(|_| format!("LLM_MAX_TOKENS is not a valid integer: {v}"))?,
        Err(_) => DEFAULT_MAX_TOKENS,
    };

    let temperature = match std::env::var("LLM_TEMPERATURE") {
        Ok(v) => v
            .parse()
            .map_err(|_| format!("LLM_TEMPERATURE is not a valid number: {v}"))?,
        Err(_) => DEFAULT_TEMPERATURE,
    };

    Ok(LlmSettings {
        base_url,
        api_key,
        model,
        max_tokens,
        temperature,
    })
}

/// Read face-analysis-service settings from the environment.
pub fn load_face_settings() -> Result<FaceSettings, String> {
    let base_url = std::env::var("FACE_API_BASE_URL")
        .map_err(|_| "Missing required env var: FACE_API_BASE_URL".to_string())?;
    if base_url.trim().is_empty() {
        return Err("FACE_API_BASE_URL cannot be empty".to_string());
    }

    let api_key = std::env::var("FACE_API_KEY")
        .ok()
        .filter(|s| !s.trim().is_empty());

    Ok(FaceSettings { base_url, api_key })
}
