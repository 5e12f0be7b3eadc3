//! Server-rendered HTML.
//!
//! The whole page is rebuilt on every interaction: title and instructions,
//! the detect control, the message input, and the full chat history in
//! insertion order. Action outcomes surface as an inline [`Flash`] indicator
//! rather than error pages.

use crate::emotion::EmotionLabel;
use crate::session::{ChatLine, Speaker};

/// Inline status indicator shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    /// The action succeeded.
    Success(String),
    /// A precondition failed; no external call was made.
    Warn(String),
    /// An external call or the session itself failed.
    Error(String),
}

impl Flash {
    fn class(&self) -> &'static str {
        match self {
            Self::Success(_) => "flash flash-success",
            Self::Warn(_) => "flash flash-warn",
            Self::Error(_) => "flash flash-error",
        }
    }

    fn text(&self) -> &str {
        match self {
            Self::Success(t) | Self::Warn(t) | Self::Error(t) => t,
        }
    }
}

/// Minimal HTML escaping for interpolated user/model text.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Generate the HTML shell for the application.
fn html_shell(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Emotion-aware chat demo">
    <title>{title} - Emochat</title>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body>
    <main class="container">
{content}
    </main>
</body>
</html>"#
    )
}

fn flash_html(flash: Option<&Flash>) -> String {
    match flash {
        Some(f) => format!(
            r#"<p class="{}" role="status">{}</p>"#,
            f.class(),
            escape_html(f.text())
        ),
        None => String::new(),
    }
}

fn emotion_badge(emotion: Option<EmotionLabel>) -> String {
    match emotion {
        Some(label) => format!(
            r#"<p class="emotion-badge">Current emotion: <strong>{label}</strong></p>"#
        ),
        None => r#"<p class="emotion-badge muted">No emotion detected yet.</p>"#.to_string(),
    }
}

fn history_html(history: &[ChatLine]) -> String {
    if history.is_empty() {
        return r#"<p class="muted">No messages yet.</p>"#.to_string();
    }

    history
        .iter()
        .map(|line| {
            let class = match line.speaker {
                Speaker::User => "line line-user",
                Speaker::Assistant => "line line-ai",
            };
            format!(
                r#"<p class="{class}"><span class="who">{}:</span> {}</p>"#,
                line.speaker.prefix(),
                escape_html(&line.text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the full application page.
#[must_use]
pub fn render_page(
    session_id: &str,
    emotion: Option<EmotionLabel>,
    history: &[ChatLine],
    flash: Option<&Flash>,
) -> String {
    let sid = escape_html(session_id);
    let content = format!(
        r#"        <h1>Emotion-Based AI Chatbot</h1>
        <p>This app detects your emotion and lets you chat with an AI that responds based on your mood!</p>
        {flash}
        <section class="card">
            <h2>Step 1: Detect Your Emotion</h2>
            <form action="/detect" method="post" enctype="multipart/form-data">
                <input type="hidden" name="session_id" value="{sid}">
                <input type="file" name="photo" accept="image/*" capture="user">
                <button type="submit">Detect Emotion</button>
            </form>
            {badge}
        </section>
        <section class="card">
            <h2>Step 2: Chat with the AI</h2>
            <form action="/send" method="post">
                <input type="hidden" name="session_id" value="{sid}">
                <input type="text" name="message" placeholder="Type your message here:" autocomplete="off">
                <button type="submit">Send</button>
            </form>
        </section>
        <section class="card">
            <h2>Chat History</h2>
            {history}
        </section>
        <form action="/reset" method="post" class="reset">
            <input type="hidden" name="session_id" value="{sid}">
            <button type="submit">Start over</button>
        </form>"#,
        flash = flash_html(flash),
        badge = emotion_badge(emotion),
        history = history_html(history),
    );

    html_shell("Chat", &content)
}

/// Render the generic top-level failure page.
#[must_use]
pub fn render_failure_page() -> String {
    html_shell(
        "Error",
        r#"        <h1>Something went wrong</h1>
        <p class="flash flash-error" role="status">An unexpected error occurred. Please refresh the page and try again.</p>"#,
    )
}
