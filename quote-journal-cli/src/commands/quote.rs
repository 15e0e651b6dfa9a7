//! Quote command - fetch and print one quote

use anyhow::Result;
use colored::Colorize;

use super::load_config;
use crate::output;
use quote_journal_core::domain::QUOTE_FETCH_FAILED;
use quote_journal_core::{QuoteFetch, QuoteJournalContext};

/// Works logged out and without a Firebase project.
pub async fn run(force_demo: bool, json: bool) -> Result<()> {
    let config = load_config(force_demo)?;
    let service = QuoteJournalContext::quote_service(&config)?;

    let bar = (!json).then(|| output::spinner("Fetching quote..."));
    let outcome = service.fetch_quote().await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        QuoteFetch::Fetched(quote) => println!("{}", format!("\"{}\"", quote).italic()),
        QuoteFetch::Fallback => output::warning(QUOTE_FETCH_FAILED),
    }
    Ok(())
}
