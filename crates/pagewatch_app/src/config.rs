//! Run configuration: a RON file plus the push key from the environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pagewatch_core::{FingerprintMode, SelectionPolicy};
use pagewatch_engine::{
    BrowserSettings, ExtractionStrategy, FetchSettings, NotifySettings, RenderSettings,
    WatchSettings,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "PAGEWATCH_CONFIG";
/// Environment variable holding the push endpoint key.
pub const PUSH_KEY_VAR: &str = "SENDKEY";
const DEFAULT_CONFIG_PATH: &str = "pagewatch.ron";
const DEFAULT_TARGET_URL: &str = "https://pokemmo.lanbizi.com/monster-alpha";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("environment variable {0} is missing or empty")]
    MissingKey(&'static str),
}

/// Where `AppConfig::load_or_default` took the configuration from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    /// The file does not exist; built-in defaults apply.
    Defaults,
}

/// Which `Renderer` turns the target page into a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RendererKind {
    /// Headless Chrome; runs the page's script before the snapshot.
    #[default]
    Browser,
    /// Plain HTTP fetch of the served markup, for static pages.
    Http,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub sandbox: bool,
    pub chrome_path: Option<PathBuf>,
    pub window_size: (u32, u32),
    pub navigation_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        let settings = BrowserSettings::default();
        Self {
            headless: settings.headless,
            sandbox: settings.sandbox,
            chrome_path: settings.chrome_path,
            window_size: settings.window_size,
            navigation_timeout_secs: settings.navigation_timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    #[default]
    Terminal,
    File,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub destination: LogDestination,
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            destination: LogDestination::Terminal,
            file: PathBuf::from("pagewatch.log"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub target_url: String,
    pub renderer: RendererKind,
    pub browser: BrowserConfig,
    pub state_path: PathBuf,
    pub strategies: Vec<ExtractionStrategy>,
    pub fingerprint_mode: FingerprintMode,
    pub selection: SelectionPolicy,
    pub settle_delay_ms: u64,
    pub sample_byte_limit: usize,
    pub notify_title: String,
    pub error_title: String,
    pub notify_timeout_secs: u64,
    pub push_base_url: String,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            renderer: RendererKind::default(),
            browser: BrowserConfig::default(),
            state_path: PathBuf::from("last_hash.txt"),
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
            settle_delay_ms: 6_000,
            sample_byte_limit: 1_000,
            notify_title: "Page changed".to_string(),
            error_title: "Page watcher error".to_string(),
            notify_timeout_secs: 10,
            push_base_url: NotifySettings::default().base_url,
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_ron(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&content, path)
    }

    /// Like `load`, but a missing file means the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok((config, ConfigSource::File)),
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok((Self::default(), ConfigSource::Defaults))
            }
            Err(err) => Err(err),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_url.trim().is_empty() {
            return Err(ConfigError::Invalid("target_url is empty".into()));
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::Invalid("strategies must not be empty".into()));
        }
        if self.sample_byte_limit == 0 {
            return Err(ConfigError::Invalid("sample_byte_limit must be > 0".into()));
        }
        if self.notify_timeout_secs == 0 {
            return Err(ConfigError::Invalid("notify_timeout_secs must be > 0".into()));
        }
        if self.browser.navigation_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "browser.navigation_timeout_secs must be > 0".into(),
            ));
        }
        if self.browser.window_size.0 == 0 || self.browser.window_size.1 == 0 {
            return Err(ConfigError::Invalid("browser.window_size must be non-zero".into()));
        }
        if self.state_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("state_path is empty".into()));
        }
        Ok(())
    }

    pub fn watch_settings(&self) -> WatchSettings {
        WatchSettings {
            target_url: self.target_url.clone(),
            strategies: self.strategies.clone(),
            fingerprint_mode: self.fingerprint_mode,
            selection: self.selection.clone(),
            sample_byte_limit: self.sample_byte_limit,
            notify_title: self.notify_title.clone(),
            error_title: self.error_title.clone(),
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            fetch: FetchSettings::default(),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }

    pub fn browser_settings(&self) -> BrowserSettings {
        BrowserSettings {
            headless: self.browser.headless,
            sandbox: self.browser.sandbox,
            chrome_path: self.browser.chrome_path.clone(),
            window_size: self.browser.window_size,
            navigation_timeout: Duration::from_secs(self.browser.navigation_timeout_secs),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }

    pub fn notify_settings(&self) -> NotifySettings {
        NotifySettings {
            base_url: self.push_base_url.clone(),
            timeout: Duration::from_secs(self.notify_timeout_secs),
        }
    }
}

/// Config file location: `$PAGEWATCH_CONFIG`, else `./pagewatch.ron`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub fn push_key_from_env() -> Result<String, ConfigError> {
    push_key(std::env::var(PUSH_KEY_VAR).ok())
}

fn push_key(raw: Option<String>) -> Result<String, ConfigError> {
    raw.map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or(ConfigError::MissingKey(PUSH_KEY_VAR))
}
