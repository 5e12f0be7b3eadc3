//! HTTP server, routes, and the per-action interaction handlers.
//!
//! Each UI action maps to one handler; every handler re-renders and returns
//! the full page with status 200, surfacing failures as inline indicators.
//! A panic anywhere below the router is caught and rendered as the generic
//! failure page instead of tearing the process down.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::session::{DEFAULT_SESSION_TIMEOUT, Session};
use crate::ui::{self, Flash};
use crate::AppState;

/// Upload limit for captured photos (10MB).
const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// How often idle sessions are reaped.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/detect", post(detect_handler))
        .route("/send", post(send_handler))
        .route("/reset", post(reset_handler))
        .route("/healthz", get(healthz_handler))
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, state: AppState) -> anyhow::Result<()> {
    // Reap idle sessions in the background.
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            tick.tick().await;
            let removed = sessions.cleanup_expired_with_timeout(DEFAULT_SESSION_TIMEOUT);
            if removed > 0 {
                tracing::debug!(removed, "Reaped idle sessions");
            }
        }
    });

    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");
    Html(ui::render_failure_page()).into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Start a fresh session and render the empty page.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let session = state.sessions.create();
    tracing::debug!(session_id = %session.id(), "New visit");
    render(&session, None)
}

/// GET /healthz - Liveness probe.
async fn healthz_handler() -> &'static str {
    "ok"
}

/// Look up the posted session, or start a fresh one when it is gone
/// (server restart or idle reaping).
fn resolve_session(state: &AppState, id: &str) -> (Session, Option<Flash>) {
    if let Some(session) = state.sessions.get(id) {
        (session, None)
    } else {
        tracing::debug!(session_id = %id, "Unknown session, starting fresh");
        let session = state.sessions.create();
        let notice = Flash::Error(
            "Your session expired, so a new one was started. Please detect your emotion again."
                .to_string(),
        );
        (session, Some(notice))
    }
}

/// POST /detect - Classify the uploaded photo and remember the emotion.
async fn detect_handler(State(state): State<AppState>, mut multipart: Multipart) -> Html<String> {
    let mut session_id = String::new();
    let mut photo: Option<(Vec<u8>, String)> = None;

    // A truncated or malformed upload reads as a capture failure below.
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("session_id") => {
                if let Ok(text) = field.text().await {
                    session_id = text;
                }
            }
            Some("photo") => {
                let content_type = field
                    .content_type()
                    .map_or_else(|| "image/jpeg".to_string(), ToString::to_string);
                if let Ok(bytes) = field.bytes().await {
                    if !bytes.is_empty() {
                        photo = Some((bytes.to_vec(), content_type));
                    }
                }
            }
            _ => {}
        }
    }

    let (session, expired) = resolve_session(&state, &session_id);
    if let Some(notice) = expired {
        return render(&session, Some(&notice));
    }

    let Some((bytes, content_type)) = photo else {
        // No frame available; the prior emotion, if any, stays in effect.
        return render(
            &session,
            Some(&Flash::Error(
                "No image was captured. Please try again.".to_string(),
            )),
        );
    };

    let flash = match state.classifier.classify(&bytes, &content_type).await {
        Ok(label) => {
            session.set_emotion(label);
            info!(
                session_id = %session.id(),
                emotion = %label,
                "Emotion detected"
            );
            Flash::Success(format!("Detected Emotion: {label}"))
        }
        Err(e) => {
            tracing::error!(
                session_id = %session.id(),
                error = %e,
                "Emotion detection failed"
            );
            // A failed detection leaves the last successful one in place.
            Flash::Error("Could not detect emotion. Please try again.".to_string())
        }
    };

    render(&session, Some(&flash))
}

/// Form body for the send action.
#[derive(Debug, Deserialize)]
struct SendForm {
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    message: String,
}

/// POST /send - Validate, generate a reply, and append the exchange.
async fn send_handler(State(state): State<AppState>, Form(form): Form<SendForm>) -> Html<String> {
    let (session, expired) = resolve_session(&state, &form.session_id);
    if let Some(notice) = expired {
        return render(&session, Some(&notice));
    }

    // Preconditions; no external call is attempted when either fails.
    let Some(emotion) = session.emotion() else {
        return render(
            &session,
            Some(&Flash::Warn(
                "Please detect your emotion first!".to_string(),
            )),
        );
    };
    let message = form.message.trim();
    if message.is_empty() {
        return render(
            &session,
            Some(&Flash::Warn("Please enter a message!".to_string())),
        );
    }

    let reply = match state.generator.reply(message, emotion).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(
                session_id = %session.id(),
                error = %e,
                "Reply generation failed, substituting fallback"
            );
            crate::llm::FALLBACK_REPLY.to_string()
        }
    };

    session.record_exchange(message, reply);
    info!(
        session_id = %session.id(),
        line_count = session.line_count(),
        "Exchange recorded"
    );

    render(&session, None)
}

/// Form body for the reset action.
#[derive(Debug, Deserialize)]
struct ResetForm {
    #[serde(default)]
    session_id: String,
}

/// POST /reset - Destroy the session and start a fresh one.
async fn reset_handler(State(state): State<AppState>, Form(form): Form<ResetForm>) -> Html<String> {
    if state.sessions.remove(&form.session_id).is_some() {
        tracing::debug!(session_id = %form.session_id, "Session destroyed");
    }
    let session = state.sessions.create();
    render(&session, None)
}

fn render(session: &Session, flash: Option<&Flash>) -> Html<String> {
    Html(ui::render_page(
        session.id(),
        session.emotion(),
        &session.history(),
        flash,
    ))
}
