use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};
use pagewatch_logging::{watch_debug, watch_info};

use crate::{FailureKind, RenderError, Renderer, Snapshot};

/// Flags passed to every launched Chrome, on top of the headless/sandbox switches.
const EXTRA_CHROME_ARGS: [&str; 2] = ["--disable-dev-shm-usage", "--disable-gpu"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Chrome's own sandbox; usually unavailable inside containers and CI runners.
    pub sandbox: bool,
    /// Chrome executable; `None` searches the usual install locations.
    pub chrome_path: Option<PathBuf>,
    pub window_size: (u32, u32),
    /// Bound on navigation and on each DevTools call.
    pub navigation_timeout: Duration,
    /// Wait after navigation so client-side script can build the page.
    pub settle_delay: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            chrome_path: None,
            window_size: (1920, 1080),
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(6),
        }
    }
}

/// Renderer driving a headless Chrome over DevTools.
///
/// Each render launches a fresh browser, navigates, lets page script run for
/// the settle delay and snapshots the resulting DOM.
#[derive(Debug, Clone)]
pub struct BrowserRenderer {
    settings: BrowserSettings,
}

impl BrowserRenderer {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn launch_options(&self) -> Result<LaunchOptions<'static>, RenderError> {
        let settings = &self.settings;
        LaunchOptions::default_builder()
            .headless(settings.headless)
            .sandbox(settings.sandbox)
            .window_size(Some(settings.window_size))
            .path(settings.chrome_path.clone())
            .idle_browser_timeout(settings.navigation_timeout + settings.settle_delay)
            .args(EXTRA_CHROME_ARGS.into_iter().map(OsStr::new).collect())
            .build()
            .map_err(|err| browser_error("launch options", err))
    }

    /// Blocking part of a render: everything that talks to Chrome.
    fn capture(&self, url: &str) -> Result<Snapshot, RenderError> {
        let browser =
            Browser::new(self.launch_options()?).map_err(|err| browser_error("launch", err))?;
        let tab = browser.new_tab().map_err(|err| browser_error("new tab", err))?;
        tab.set_default_timeout(self.settings.navigation_timeout);
        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|err| browser_error("navigate", err))?;

        if !self.settings.settle_delay.is_zero() {
            watch_debug!("Settling for {:?}", self.settings.settle_delay);
            std::thread::sleep(self.settings.settle_delay);
        }

        let html = tab
            .get_content()
            .map_err(|err| browser_error("page content", err))?;
        let final_url = tab.get_url();
        watch_debug!("Captured {} ({} chars)", final_url, html.chars().count());
        Ok(Snapshot::from_html(final_url, html))
    }
}

fn browser_error(step: &str, err: impl std::fmt::Display) -> RenderError {
    RenderError::new(FailureKind::Browser, format!("{step}: {err}"))
}

#[async_trait::async_trait]
impl Renderer for BrowserRenderer {
    async fn render(&self, url: &str) -> Result<Snapshot, RenderError> {
        reqwest::Url::parse(url)
            .map_err(|err| RenderError::new(FailureKind::InvalidUrl, err.to_string()))?;
        watch_info!("Rendering {} in headless Chrome", url);

        let renderer = self.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || renderer.capture(&url))
            .await
            .map_err(|err| browser_error("render task", err))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_options_carry_settings() {
        let renderer = BrowserRenderer::new(BrowserSettings {
            chrome_path: Some(PathBuf::from("/opt/chrome/chrome")),
            window_size: (1280, 720),
            ..BrowserSettings::default()
        });
        let options = renderer.launch_options().unwrap();

        assert!(options.headless);
        assert!(!options.sandbox);
        assert_eq!(options.window_size, Some((1280, 720)));
        assert_eq!(options.path, Some(PathBuf::from("/opt/chrome/chrome")));
        assert_eq!(options.idle_browser_timeout, Duration::from_secs(36));
        assert_eq!(options.args.len(), EXTRA_CHROME_ARGS.len());
    }

    #[tokio::test]
    async fn malformed_url_fails_before_launching_chrome() {
        let renderer = BrowserRenderer::new(BrowserSettings {
            chrome_path: Some(PathBuf::from("/nonexistent/chrome")),
            ..BrowserSettings::default()
        });
        let err = renderer.render("not a url").await.unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }

    #[tokio::test]
    async fn missing_chrome_is_a_browser_failure() {
        let renderer = BrowserRenderer::new(BrowserSettings {
            chrome_path: Some(PathBuf::from("/nonexistent/pagewatch/chrome")),
            settle_delay: Duration::ZERO,
            ..BrowserSettings::default()
        });
        let err = renderer
            .render("https://example.com/monster-alpha")
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Browser);
        assert!(err.message.starts_with("launch"), "{}", err.message);
    }
}
