//! Config command - show settings and toggle demo mode

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::{get_app_dir, load_config};
use crate::output;
use quote_journal_core::config::{Config, SETTINGS_FILE};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Turn demo mode on or off
    Demo {
        #[command(subcommand)]
        command: DemoCommands,
    },
}

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Enable demo mode
    #[command(name = "on")]
    On,
    /// Disable demo mode
    #[command(name = "off")]
    Off,
}

pub fn run(command: ConfigCommands, force_demo: bool) -> Result<()> {
    match command {
        ConfigCommands::Show { json } => show(&load_config(force_demo)?, json),
        ConfigCommands::Demo { command } => {
            let app_dir = get_app_dir()?;
            let mut config = Config::load(&app_dir)?;
            match command {
                DemoCommands::On => {
                    config.enable_demo_mode();
                    config.save(&app_dir)?;
                    println!("{}", "Demo mode enabled".green());
                    println!("Accounts and entries now live in memory for each run.");
                }
                DemoCommands::Off => {
                    config.disable_demo_mode();
                    config.save(&app_dir)?;
                    println!("{}", "Demo mode disabled".yellow());
                    if let Err(e) = config.validate() {
                        output::warning(&e.to_string());
                    }
                }
            }
            Ok(())
        }
    }
}

fn show(config: &Config, json: bool) -> Result<()> {
    let api_key = config.firebase.api_key.as_deref().map(output::mask);

    if json {
        let value = json!({
            "settingsFile": get_app_dir()?.join(SETTINGS_FILE),
            "demoMode": config.demo_mode,
            "firebase": {
                "apiKey": api_key,
                "projectId": config.firebase.project_id,
                "authDomain": config.firebase.auth_domain,
                "authUrl": config.firebase.auth_url,
                "tokenUrl": config.firebase.token_url,
                "firestoreUrl": config.firebase.firestore_url,
            },
            "quotes": config.quotes,
            "http": { "timeoutSecs": config.http_timeout.as_secs() },
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let unset = || "(not set)".dimmed().to_string();
    let demo = if config.demo_mode {
        "ON".green().to_string()
    } else {
        "OFF".yellow().to_string()
    };

    let mut table = output::create_table();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![
        "Settings file".to_string(),
        get_app_dir()?.join(SETTINGS_FILE).display().to_string(),
    ]);
    table.add_row(vec!["Demo mode".to_string(), demo]);
    table.add_row(vec!["Firebase API key".to_string(), api_key.unwrap_or_else(unset)]);
    table.add_row(vec![
        "Firebase project".to_string(),
        config.firebase.project_id.clone().unwrap_or_else(unset),
    ]);
    table.add_row(vec!["Firestore URL".to_string(), config.firebase.firestore_url.clone()]);
    table.add_row(vec!["Quote URL".to_string(), config.quotes.quote_url.clone()]);
    table.add_row(vec!["Relay URL".to_string(), config.quotes.relay_url.clone()]);
    table.add_row(vec![
        "HTTP timeout".to_string(),
        format!("{} s", config.http_timeout.as_secs()),
    ]);
    println!("{table}");

    if let Err(e) = config.validate() {
        output::warning(&e.to_string());
    }
    Ok(())
}
