use std::sync::Arc;

use pagewatch_core::{
    classify, fingerprint, ChangeOutcome, FingerprintMode, PersistedState, SelectionPolicy,
};
use pagewatch_logging::{watch_error, watch_info, watch_warn};
use thiserror::Error;

use crate::{
    extract, ExtractionStrategy, FileStateStore, Notifier, PersistError, RenderError, Renderer,
};

/// Upper bound on the characters of a diagnostic alert body.
const ERROR_BODY_MAX_CHARS: usize = 500;
/// Upper bound on new items listed in a change notification.
const ADDED_LIST_MAX: usize = 10;

/// Produces the wall-clock time shown in notifications.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub target_url: String,
    pub strategies: Vec<ExtractionStrategy>,
    pub fingerprint_mode: FingerprintMode,
    pub selection: SelectionPolicy,
    pub sample_byte_limit: usize,
    pub notify_title: String,
    pub error_title: String,
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("could not record state: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    Changed { highlight: String, delivered: bool },
    Unchanged,
    InsufficientData { reason: String },
    Failed { error: String },
}

/// One observation cycle: render, extract, fingerprint, compare, notify, record.
pub struct Watcher {
    settings: WatchSettings,
    renderer: Box<dyn Renderer>,
    notifier: Box<dyn Notifier>,
    store: FileStateStore,
    clock: Clock,
}

impl Watcher {
    pub fn new(
        settings: WatchSettings,
        renderer: Box<dyn Renderer>,
        notifier: Box<dyn Notifier>,
        store: FileStateStore,
    ) -> Self {
        Self {
            settings,
            renderer,
            notifier,
            store,
            clock: Arc::new(String::new),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &WatchSettings {
        &self.settings
    }

    /// Runs one cycle. Failures end the run without touching state and are
    /// reported through the notifier on a best-effort basis.
    pub async fn run_once(&self) -> RunReport {
        match self.observe().await {
            Ok(report) => report,
            Err(err) => {
                watch_error!("Run failed for {}: {}", self.settings.target_url, err);
                let body = truncate_chars(&err.to_string(), ERROR_BODY_MAX_CHARS);
                if let Err(notify_err) = self.notifier.send(&self.settings.error_title, &body).await
                {
                    watch_warn!("Diagnostic alert not delivered: {}", notify_err);
                }
                RunReport::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    async fn observe(&self) -> Result<RunReport, WatchError> {
        let settings = &self.settings;
        let snapshot = self.renderer.render(&settings.target_url).await?;
        let result = extract(&snapshot, &settings.strategies);
        let current = fingerprint(&result, settings.fingerprint_mode, settings.sample_byte_limit);
        let last = self.store.load();

        match classify(&current, &last.fingerprint, &result, &settings.selection) {
            ChangeOutcome::Unchanged => {
                watch_info!("No change at {}", settings.target_url);
                Ok(RunReport::Unchanged)
            }
            ChangeOutcome::InsufficientData(reason) => {
                watch_info!("Not enough data to report: {}", reason);
                Ok(RunReport::InsufficientData { reason })
            }
            ChangeOutcome::Changed { highlight, added } => {
                watch_info!("Change detected at {}: {}", settings.target_url, highlight);
                let body = self.change_body(&highlight, &added);
                let delivered = match self.notifier.send(&settings.notify_title, &body).await {
                    Ok(()) => true,
                    Err(err) => {
                        watch_warn!("Change notification not delivered: {}", err);
                        false
                    }
                };
                self.store.save(&PersistedState::observed(current, &result))?;
                Ok(RunReport::Changed {
                    highlight,
                    delivered,
                })
            }
        }
    }

    fn change_body(&self, highlight: &str, added: &[String]) -> String {
        let mut sections = vec![format!("Content updated: {highlight}")];
        if !added.is_empty() {
            let mut listed = added
                .iter()
                .take(ADDED_LIST_MAX)
                .map(|item| format!("- {item}"))
                .collect::<Vec<_>>();
            if added.len() > ADDED_LIST_MAX {
                listed.push(format!("(+{} more)", added.len() - ADDED_LIST_MAX));
            }
            sections.push(format!("New:\n{}", listed.join("\n")));
        }
        sections.push(self.settings.target_url.clone());
        let now = (self.clock)();
        if !now.is_empty() {
            sections.push(now);
        }
        sections.join("\n\n")
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
