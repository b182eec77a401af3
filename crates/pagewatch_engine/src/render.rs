use std::time::Duration;

use pagewatch_logging::{watch_debug, watch_info};

use crate::{decode_html, FailureKind, FetchSettings, RenderError, ReqwestFetcher, Snapshot};

/// Turns a URL into a queryable snapshot.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<Snapshot, RenderError>;
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub fetch: FetchSettings,
    /// Fixed wait before the snapshot is handed out. Not a retry.
    pub settle_delay: Duration,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            settle_delay: Duration::from_secs(6),
        }
    }
}

/// Renderer over a plain HTTP fetch of the served markup.
///
/// Client-side script is not executed; pages that build their content in the
/// browser need `BrowserRenderer`.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    fetcher: ReqwestFetcher,
    settle_delay: Duration,
}

impl HttpRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            fetcher: ReqwestFetcher::new(settings.fetch),
            settle_delay: settings.settle_delay,
        }
    }
}

#[async_trait::async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<Snapshot, RenderError> {
        watch_info!("Rendering {}", url);
        let output = self.fetcher.fetch(url).await?;
        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref())
            .map_err(|err| RenderError::new(FailureKind::Decode, err.to_string()))?;
        watch_debug!(
            "Decoded {} as {} ({} chars)",
            output.metadata.final_url,
            decoded.encoding_label,
            decoded.html.chars().count()
        );

        if !self.settle_delay.is_zero() {
            watch_debug!("Settling for {:?}", self.settle_delay);
            tokio::time::sleep(self.settle_delay).await;
        }

        Ok(Snapshot::from_html(output.metadata.final_url, decoded.html))
    }
}
