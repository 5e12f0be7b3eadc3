//! End-to-end interaction tests against the full router.
//!
//! The two external collaborators are replaced with in-process stubs so the
//! handlers' validation, degradation, and history behavior can be observed
//! without network access.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use serde::Serialize;

use emochat::AppState;
use emochat::emotion::{ClassificationError, EmotionClassifier, EmotionLabel};
use emochat::llm::{FALLBACK_REPLY, GenerationError, ReplyGenerator};
use emochat::server;
use emochat::session::{ChatLine, SessionStore};

/// Classifier stub: returns a fixed label, or fails when none is set.
struct StubClassifier {
    label: Option<EmotionLabel>,
    calls: AtomicUsize,
}

impl StubClassifier {
    fn returning(label: EmotionLabel) -> Self {
        Self {
            label: Some(label),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            label: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmotionClassifier for StubClassifier {
    async fn classify(
        &self,
        _image: &[u8],
        _content_type: &str,
    ) -> Result<EmotionLabel, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.label.ok_or(ClassificationError::NoResult)
    }
}

/// Generator stub: echoes the message, or fails; records every invocation.
struct StubGenerator {
    fail: bool,
    requests: Mutex<Vec<(String, EmotionLabel)>>,
}

impl StubGenerator {
    fn echoing() -> Self {
        Self {
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ReplyGenerator for StubGenerator {
    async fn reply(
        &self,
        message: &str,
        emotion: EmotionLabel,
    ) -> Result<String, GenerationError> {
        self.requests
            .lock()
            .unwrap()
            .push((message.to_string(), emotion));
        if self.fail {
            Err(GenerationError::EmptyCompletion)
        } else {
            Ok(format!("echo: {message}"))
        }
    }
}

#[derive(Serialize)]
struct SendForm<'a> {
    session_id: &'a str,
    message: &'a str,
}

struct Harness {
    server: TestServer,
    state: AppState,
    classifier: Arc<StubClassifier>,
    generator: Arc<StubGenerator>,
}

fn harness(classifier: StubClassifier, generator: StubGenerator) -> Harness {
    let classifier = Arc::new(classifier);
    let generator = Arc::new(generator);
    let classifier_handle: Arc<dyn EmotionClassifier> = classifier.clone();
    let generator_handle: Arc<dyn ReplyGenerator> = generator.clone();
    let state = AppState {
        classifier: classifier_handle,
        generator: generator_handle,
        sessions: SessionStore::new(),
    };
    let server = TestServer::new(server::router(state.clone())).unwrap();
    Harness {
        server,
        state,
        classifier,
        generator,
    }
}

fn photo_form(session_id: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("session_id", session_id.to_string())
        .add_part(
            "photo",
            Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
                .file_name("cam.jpg")
                .mime_type("image/jpeg"),
        )
}

#[tokio::test]
async fn send_without_emotion_warns_and_leaves_history_alone() {
    let h = harness(StubClassifier::failing(), StubGenerator::echoing());
    let session = h.state.sessions.create();

    let res = h
        .server
        .post("/send")
        .form(&SendForm {
            session_id: session.id(),
            message: "hello there",
        })
        .await;

    res.assert_status_ok();
    assert!(res.text().contains("Please detect your emotion first!"));
    assert_eq!(session.line_count(), 0);
    assert!(h.generator.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn blank_message_warns_and_leaves_history_alone() {
    let h = harness(StubClassifier::failing(), StubGenerator::echoing());
    let session = h.state.sessions.create();
    session.set_emotion(EmotionLabel::Happy);

    let res = h
        .server
        .post("/send")
        .form(&SendForm {
            session_id: session.id(),
            message: "   \t ",
        })
        .await;

    res.assert_status_ok();
    assert!(res.text().contains("Please enter a message!"));
    assert_eq!(session.line_count(), 0);
    assert!(h.generator.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn successful_send_appends_user_then_ai_line() {
    let h = harness(StubClassifier::failing(), StubGenerator::echoing());
    let session = h.state.sessions.create();
    session.set_emotion(EmotionLabel::Happy);

    let res = h
        .server
        .post("/send")
        .form(&SendForm {
            session_id: session.id(),
            message: "I got the job!",
        })
        .await;

    res.assert_status_ok();

    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], ChatLine::user("I got the job!"));
    assert_eq!(history[1], ChatLine::assistant("echo: I got the job!"));

    // The generator saw the literal message and the detected emotion.
    let requests = h.generator.requests.lock().unwrap();
    assert_eq!(
        requests.as_slice(),
        &[("I got the job!".to_string(), EmotionLabel::Happy)]
    );

    let body = res.text();
    let you = body.find("You:").unwrap();
    let ai = body.find("AI:").unwrap();
    assert!(you < ai);
}

#[tokio::test]
async fn generation_failure_substitutes_fallback_reply() {
    let h = harness(StubClassifier::failing(), StubGenerator::failing());
    let session = h.state.sessions.create();
    session.set_emotion(EmotionLabel::Sad);

    let res = h
        .server
        .post("/send")
        .form(&SendForm {
            session_id: session.id(),
            message: "rough day",
        })
        .await;

    res.assert_status_ok();

    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], ChatLine::user("rough day"));
    assert_eq!(history[1], ChatLine::assistant(FALLBACK_REPLY));
}

#[tokio::test]
async fn two_sends_produce_history_of_four_in_order() {
    let h = harness(StubClassifier::failing(), StubGenerator::echoing());
    let session = h.state.sessions.create();
    session.set_emotion(EmotionLabel::Neutral);

    for message in ["first", "second"] {
        let res = h
            .server
            .post("/send")
            .form(&SendForm {
                session_id: session.id(),
                message,
            })
            .await;
        res.assert_status_ok();
    }

    let history = session.history();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0], ChatLine::user("first"));
    assert_eq!(history[1], ChatLine::assistant("echo: first"));
    assert_eq!(history[2], ChatLine::user("second"));
    assert_eq!(history[3], ChatLine::assistant("echo: second"));
}

#[tokio::test]
async fn detect_success_overwrites_session_emotion() {
    let h = harness(
        StubClassifier::returning(EmotionLabel::Happy),
        StubGenerator::echoing(),
    );
    let session = h.state.sessions.create();
    session.set_emotion(EmotionLabel::Sad);

    let res = h
        .server
        .post("/detect")
        .multipart(photo_form(session.id()))
        .await;

    res.assert_status_ok();
    assert!(res.text().contains("Detected Emotion: happy"));
    assert_eq!(session.emotion(), Some(EmotionLabel::Happy));
    assert_eq!(h.classifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn detect_failure_keeps_prior_emotion() {
    let h = harness(StubClassifier::failing(), StubGenerator::echoing());
    let session = h.state.sessions.create();
    session.set_emotion(EmotionLabel::Sad);
    session.record_exchange("earlier", "reply");

    let res = h
        .server
        .post("/detect")
        .multipart(photo_form(session.id()))
        .await;

    res.assert_status_ok();
    assert!(res.text().contains("Could not detect emotion"));
    assert_eq!(session.emotion(), Some(EmotionLabel::Sad));
    // Prior conversation is untouched by a failed detection.
    assert_eq!(session.line_count(), 2);
}

#[tokio::test]
async fn detect_without_photo_is_a_capture_failure() {
    let h = harness(
        StubClassifier::returning(EmotionLabel::Happy),
        StubGenerator::echoing(),
    );
    let session = h.state.sessions.create();

    let form = MultipartForm::new().add_text("session_id", session.id().to_string());
    let res = h.server.post("/detect").multipart(form).await;

    res.assert_status_ok();
    assert!(res.text().contains("No image was captured"));
    assert!(session.emotion().is_none());
    // The classifier is never consulted without a frame.
    assert_eq!(h.classifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_session_gets_a_fresh_one_with_notice() {
    let h = harness(StubClassifier::failing(), StubGenerator::echoing());

    let res = h
        .server
        .post("/send")
        .form(&SendForm {
            session_id: "no-such-session",
            message: "hello",
        })
        .await;

    res.assert_status_ok();
    assert!(res.text().contains("session expired"));
    // A replacement session was created for the visitor.
    assert_eq!(h.state.sessions.len(), 1);
}

#[tokio::test]
async fn index_creates_a_session_and_renders_controls() {
    let h = harness(StubClassifier::failing(), StubGenerator::echoing());

    let res = h.server.get("/").await;

    res.assert_status_ok();
    let body = res.text();
    assert!(body.contains("Emotion-Based AI Chatbot"));
    assert!(body.contains("Detect Emotion"));
    assert!(body.contains("No messages yet."));
    assert_eq!(h.state.sessions.len(), 1);
}

#[tokio::test]
async fn reset_destroys_the_session_and_starts_over() {
    let h = harness(StubClassifier::failing(), StubGenerator::echoing());
    let session = h.state.sessions.create();
    session.set_emotion(EmotionLabel::Happy);
    session.record_exchange("hi", "hello");
    let old_id = session.id().to_string();

    let res = h
        .server
        .post("/reset")
        .form(&SendForm {
            session_id: &old_id,
            message: "",
        })
        .await;

    res.assert_status_ok();
    assert!(h.state.sessions.get(&old_id).is_none());
    assert!(res.text().contains("No messages yet."));
}
