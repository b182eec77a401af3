//! Pagewatch engine: rendering, extraction, persistence, notification and the run pipeline.
mod browser;
mod decode;
mod extract;
mod fetch;
mod notify;
mod persist;
mod render;
mod snapshot;
mod store;
mod types;
mod watcher;

pub use browser::{BrowserRenderer, BrowserSettings};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use extract::{extract, ExtractionStrategy, ResourceOrder};
pub use fetch::{FetchSettings, ReqwestFetcher};
pub use notify::{Notifier, NotifyError, NotifySettings, ServerChanNotifier};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use render::{HttpRenderer, RenderSettings, Renderer};
pub use snapshot::{css_urls, Element, QueryError, Snapshot};
pub use store::FileStateStore;
pub use types::{FailureKind, FetchMetadata, FetchOutput, RenderError};
pub use watcher::{Clock, RunReport, WatchError, WatchSettings, Watcher};
