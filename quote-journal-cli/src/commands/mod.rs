//! CLI command implementations

pub mod config;
pub mod quote;
pub mod start;

use std::path::PathBuf;

use anyhow::{Context, Result};
use quote_journal_core::config::{default_app_dir, Config};
use quote_journal_core::QuoteJournalContext;

/// Get the app directory, creating it if needed
pub fn get_app_dir() -> Result<PathBuf> {
    let app_dir = default_app_dir()?;
    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create app directory: {:?}", app_dir))?;
    Ok(app_dir)
}

/// Load config; `--demo` forces demo mode for this run only
pub fn load_config(force_demo: bool) -> Result<Config> {
    let mut config = Config::load(&get_app_dir()?)?;
    if force_demo {
        config.enable_demo_mode();
    }
    Ok(config)
}

/// Build the context for this run
pub fn get_context(force_demo: bool) -> Result<QuoteJournalContext> {
    let config = load_config(force_demo)?;
    QuoteJournalContext::new(config).context("Failed to initialize Quote Journal")
}

/// Run a blocking terminal prompt without stalling the runtime's other tasks
pub fn prompt<T>(f: impl FnOnce() -> dialoguer::Result<T>) -> Result<T> {
    tokio::task::block_in_place(f).context("Prompt failed")
}
