use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, Once};

use pagewatch_core::{FingerprintMode, LabelRule, MissingLabel, Pick, SelectionPolicy};
use pagewatch_engine::{
    ExtractionStrategy, FailureKind, FileStateStore, Notifier, NotifyError, RenderError,
    Renderer, ResourceOrder, RunReport, Snapshot, WatchSettings, Watcher,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(pagewatch_logging::initialize_for_tests);
}

/// Serves canned pages in order; `None` means the render fails.
struct ScriptedRenderer {
    pages: Mutex<Vec<Option<String>>>,
}

impl ScriptedRenderer {
    fn new(pages: Vec<Option<&str>>) -> Self {
        let mut pages: Vec<Option<String>> =
            pages.into_iter().map(|p| p.map(str::to_string)).collect();
        pages.reverse();
        Self {
            pages: Mutex::new(pages),
        }
    }
}

#[async_trait::async_trait]
impl Renderer for ScriptedRenderer {
    async fn render(&self, url: &str) -> Result<Snapshot, RenderError> {
        match self.pages.lock().unwrap().pop().flatten() {
            Some(html) => Ok(Snapshot::from_html(url, html)),
            None => Err(RenderError {
                kind: FailureKind::Network,
                message: "connection refused".to_string(),
            }),
        }
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        if self.fail {
            Err(NotifyError::Timeout)
        } else {
            Ok(())
        }
    }
}

fn image_settings() -> WatchSettings {
    WatchSettings {
        target_url: "https://example.com/bosses".to_string(),
        strategies: vec![ExtractionStrategy::Images {
            selector: "img".to_string(),
            attribute: "src".to_string(),
            suffix: None,
            order: ResourceOrder::FirstSeen,
        }],
        fingerprint_mode: FingerprintMode::SetBased,
        selection: SelectionPolicy {
            pick: Pick::SecondToLast,
            label: LabelRule::FileName,
            on_missing_label: MissingLabel::Insufficient,
        },
        sample_byte_limit: 1000,
        notify_title: "New boss".to_string(),
        error_title: "Watcher error".to_string(),
    }
}

fn text_settings() -> WatchSettings {
    WatchSettings {
        target_url: "https://example.com/feed".to_string(),
        strategies: vec![
            ExtractionStrategy::Rows {
                selector: ".message-item, .chat-content, li".to_string(),
                field: None,
                stop_words: Vec::new(),
                max_chars: None,
            },
            ExtractionStrategy::BodyText,
        ],
        fingerprint_mode: FingerprintMode::Scalar,
        selection: SelectionPolicy::default(),
        sample_byte_limit: 1000,
        notify_title: "Feed updated".to_string(),
        error_title: "Watcher error".to_string(),
    }
}

fn watcher(
    settings: WatchSettings,
    pages: Vec<Option<&str>>,
    notifier: &RecordingNotifier,
    state: &Path,
) -> Watcher {
    let store = FileStateStore::new(state, settings.fingerprint_mode);
    Watcher::new(
        settings,
        Box::new(ScriptedRenderer::new(pages)),
        Box::new(notifier.clone()),
        store,
    )
    .with_clock(Arc::new(|| "12:34:56".to_string()))
}

const TWO_IMAGES: &str = r#"<img src="/a/1.png"><img src="/a/2.png">"#;
const THREE_IMAGES: &str = r#"<img src="/a/1.png"><img src="/a/2.png"><img src="/a/3.png">"#;

#[tokio::test]
async fn first_run_notifies_and_records_then_stays_quiet() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let state = temp.path().join("last_images.json");
    let notifier = RecordingNotifier::default();
    let watcher = watcher(
        image_settings(),
        vec![Some(TWO_IMAGES), Some(TWO_IMAGES)],
        &notifier,
        &state,
    );

    assert_eq!(
        watcher.run_once().await,
        RunReport::Changed {
            highlight: "1.png".to_string(),
            delivered: true
        }
    );
    assert!(state.exists());
    assert_eq!(watcher.run_once().await, RunReport::Unchanged);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn added_resource_is_highlighted_and_listed() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let state = temp.path().join("last_images.json");
    fs::write(&state, r#"["/a/1.png", "/a/2.png"]"#).unwrap();
    let notifier = RecordingNotifier::default();
    let watcher = watcher(image_settings(), vec![Some(THREE_IMAGES)], &notifier, &state);

    assert_eq!(
        watcher.run_once().await,
        RunReport::Changed {
            highlight: "2.png".to_string(),
            delivered: true
        }
    );

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    let (title, body) = &sent[0];
    assert_eq!(title, "New boss");
    assert_eq!(
        body,
        "Content updated: 2.png\n\nNew:\n- /a/3.png\n\nhttps://example.com/bosses\n\n12:34:56"
    );

    let recorded: Vec<String> = serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(recorded, vec!["/a/1.png", "/a/2.png", "/a/3.png"]);
}

#[tokio::test]
async fn single_resource_is_insufficient_and_leaves_state_alone() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let state = temp.path().join("last_images.json");
    fs::write(&state, r#"["/a/1.png", "/a/2.png"]"#).unwrap();
    let notifier = RecordingNotifier::default();
    let watcher = watcher(
        image_settings(),
        vec![Some(r#"<img src="/a/9.png">"#)],
        &notifier,
        &state,
    );

    assert!(matches!(
        watcher.run_once().await,
        RunReport::InsufficientData { .. }
    ));
    assert!(notifier.sent().is_empty());
    assert_eq!(
        fs::read_to_string(&state).unwrap(),
        r#"["/a/1.png", "/a/2.png"]"#
    );
}

#[tokio::test]
async fn render_failure_sends_diagnostic_and_keeps_state() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let state = temp.path().join("last_hash.txt");
    fs::write(&state, "abc123").unwrap();
    let notifier = RecordingNotifier::default();
    let watcher = watcher(text_settings(), vec![None], &notifier, &state);

    let report = watcher.run_once().await;
    assert!(matches!(report, RunReport::Failed { .. }));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "Watcher error");
    assert!(sent[0].1.contains("connection refused"));
    assert_eq!(fs::read_to_string(&state).unwrap(), "abc123");
}

#[tokio::test]
async fn failed_delivery_still_records_state() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let state = temp.path().join("last_hash.txt");
    let notifier = RecordingNotifier::failing();
    let watcher = watcher(
        text_settings(),
        vec![Some("<ul><li>Alpha Snorlax</li><li>Alpha Lapras</li></ul>")],
        &notifier,
        &state,
    );

    assert_eq!(
        watcher.run_once().await,
        RunReport::Changed {
            highlight: "2 lines".to_string(),
            delivered: false
        }
    );
    let digest = fs::read_to_string(&state).unwrap();
    assert_eq!(digest.len(), 64);
}

#[tokio::test]
async fn volatile_tail_past_sample_limit_is_ignored() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let state = temp.path().join("last_hash.txt");
    let notifier = RecordingNotifier::default();
    let settings = WatchSettings {
        sample_byte_limit: 13,
        ..text_settings()
    };
    let watcher = watcher(
        settings,
        vec![
            Some("<ul><li>Alpha Snorlax</li><li>updated 10:01</li></ul>"),
            Some("<ul><li>Alpha Snorlax</li><li>updated 10:02</li></ul>"),
        ],
        &notifier,
        &state,
    );

    assert!(matches!(watcher.run_once().await, RunReport::Changed { .. }));
    assert_eq!(watcher.run_once().await, RunReport::Unchanged);
}

#[tokio::test]
async fn blank_page_is_not_reported_as_change() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let state = temp.path().join("last_hash.txt");
    let notifier = RecordingNotifier::default();
    let watcher = watcher(
        text_settings(),
        vec![Some("<html><body></body></html>")],
        &notifier,
        &state,
    );

    assert!(matches!(
        watcher.run_once().await,
        RunReport::InsufficientData { .. }
    ));
    assert!(notifier.sent().is_empty());
    assert!(!state.exists());
}
