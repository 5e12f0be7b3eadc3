//! Emotion-aware chat server.
//!
//! Entry point: loads configuration, wires the external-service adapters,
//! and starts the Axum server.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use emochat::AppState;
use emochat::config::{self, AppConfig};
use emochat::emotion::FaceAnalysisClient;
use emochat::llm::{ChatCompletionsClient, EmpatheticReplyGenerator};
use emochat::server;
use emochat::session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (M-LOG-STRUCTURED)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env (if present)
    let _ = dotenv();

    let app_config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let llm_settings = match config::load_llm_settings() {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Configuration error: {msg}");
            std::process::exit(1);
        }
    };

    let face_settings = match config::load_face_settings() {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Configuration error: {msg}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        name: "llm.config.loaded",
        base_url = %llm_settings.base_url,
        model = %llm_settings.model,
        "LLM configuration loaded"
    );
    tracing::info!(
        name: "face.config.loaded",
        base_url = %face_settings.base_url,
        "Face analysis configuration loaded"
    );

    let generator = EmpatheticReplyGenerator::new(ChatCompletionsClient::new(llm_settings));
    let classifier = FaceAnalysisClient::new(face_settings);

    let state = AppState {
        classifier: Arc::new(classifier),
        generator: Arc::new(generator),
        sessions: SessionStore::new(),
    };

    server::start_server(Arc::new(app_config), state).await
}
