//! `pagewatch`: observe one page once, notify on change, record the result.
//!
//! Every fault this binary can name is logged and the process still exits 0;
//! a non-zero status means something went wrong that nothing here handled.
mod config;
mod logging;

use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use pagewatch_engine::{
    BrowserRenderer, FileStateStore, HttpRenderer, Renderer, RunReport, ServerChanNotifier,
    Watcher,
};
use pagewatch_logging::{watch_error, watch_info, watch_warn};

use crate::config::{AppConfig, ConfigSource, LoggingConfig, RendererKind};

fn main() {
    let path = config::config_path();
    let config = match AppConfig::load_or_default(&path) {
        Ok((config, source)) => {
            logging::initialize(&config.logging);
            if source == ConfigSource::Defaults {
                watch_warn!("{} not found, using built-in defaults", path.display());
            }
            config
        }
        Err(err) => {
            logging::initialize(&LoggingConfig::default());
            watch_error!("Not running: {}", err);
            return;
        }
    };

    match run(config) {
        Ok(report) => watch_info!("Run finished: {:?}", report),
        Err(err) => watch_error!("Not running: {:#}", err),
    }
}

fn run(config: AppConfig) -> anyhow::Result<RunReport> {
    let key = config::push_key_from_env()?;
    let notifier = ServerChanNotifier::new(&key, config.notify_settings())
        .context("building push notifier")?;
    let renderer: Box<dyn Renderer> = match config.renderer {
        RendererKind::Browser => Box::new(BrowserRenderer::new(config.browser_settings())),
        RendererKind::Http => Box::new(HttpRenderer::new(config.render_settings())),
    };
    let store = FileStateStore::new(&config.state_path, config.fingerprint_mode);

    let watcher = Watcher::new(config.watch_settings(), renderer, Box::new(notifier), store)
        .with_clock(Arc::new(|| Local::now().format("%H:%M:%S").to_string()));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;

    watch_info!("Checking {}", watcher.settings().target_url);
    Ok(runtime.block_on(watcher.run_once()))
}
