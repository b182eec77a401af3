use std::time::Duration;

use pagewatch_logging::watch_info;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("push key is empty")]
    MissingKey,
    #[error("push request timed out")]
    Timeout,
    #[error("push endpoint answered with status {0}")]
    Status(u16),
    #[error("push request failed: {0}")]
    Transport(String),
}

/// Best-effort delivery of a title + body message.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone)]
pub struct NotifySettings {
    /// Endpoint root; the key is appended as `/{key}.send`.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            base_url: "https://sctapi.ftqq.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// ServerChan-style push: form POST of `title` and `desp` to `{base_url}/{key}.send`.
#[derive(Debug, Clone)]
pub struct ServerChanNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl ServerChanNotifier {
    pub fn new(key: &str, settings: NotifySettings) -> Result<Self, NotifyError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(NotifyError::MissingKey);
        }
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;
        let endpoint = format!("{}/{}.send", settings.base_url.trim_end_matches('/'), key);
        Ok(Self { client, endpoint })
    }
}

#[async_trait::async_trait]
impl Notifier for ServerChanNotifier {
    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("title", title), ("desp", body)])
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    NotifyError::Timeout
                } else {
                    NotifyError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        watch_info!("Push delivered: {}", title);
        Ok(())
    }
}
