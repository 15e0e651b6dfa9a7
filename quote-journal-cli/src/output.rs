//! Output formatting utilities

use std::time::Duration;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};

use quote_journal_core::view::{
    Dashboard, APP_TITLE, FAVORITES_TITLE, JOURNAL_TITLE, SAVED_TITLE,
};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Print an alert and wait for Enter, like a browser `alert()`
pub fn alert(msg: &str, is_error: bool) {
    if is_error {
        error(msg);
    } else {
        success(msg);
    }
    pause();
}

/// Wait for Enter when attached to a terminal
pub fn pause() {
    if atty::is(atty::Stream::Stdin) {
        let mut line = String::new();
        eprint!("{}", "Press Enter to continue".dimmed());
        let _ = std::io::stdin().read_line(&mut line);
    }
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Spinner shown on stderr while a request is in flight
pub fn spinner(msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

pub fn title() {
    println!();
    println!("{}", APP_TITLE.bold());
    println!();
}

/// Print the authenticated screen
pub fn dashboard(d: &Dashboard) {
    title();
    if let Some(email) = &d.user_email {
        println!("{} {}", "Signed in as".dimmed(), email);
        println!();
    }
    println!("{}", d.quote_line.italic());
    println!();

    if !d.journal_draft.is_empty() {
        println!("{} {}", "Draft:".dimmed(), d.journal_draft);
        println!();
    }

    println!("{}", JOURNAL_TITLE.bold());
    let mut table = create_table();
    for item in &d.journal {
        let mut lines = Vec::new();
        if let Some(date) = &item.date_line {
            lines.push(date.dimmed().to_string());
        }
        lines.push(item.quote_line.clone());
        lines.push(item.entry_line.clone());
        table.add_row(vec![Cell::new(lines.join("\n"))]);
    }
    if d.journal.is_empty() {
        println!("{}", "-".dimmed());
    } else {
        println!("{table}");
    }
    println!();

    println!("{}", SAVED_TITLE.bold());
    match d.saved_quotes_placeholder() {
        Some(placeholder) => println!("{}", placeholder.dimmed()),
        None => {
            for line in &d.saved_quotes {
                println!("  {}", line);
            }
        }
    }
    println!();

    if d.syncing {
        println!("{}", "Syncing...".dimmed());
        println!();
    }
}

/// Print the favorites list
pub fn favorites(d: &Dashboard) {
    println!("{}", FAVORITES_TITLE.bold());
    if d.favorites.is_empty() {
        println!("{}", "-".dimmed());
    }
    for line in &d.favorites {
        println!("  {}", line);
    }
    println!();
}

/// Mask a secret, keeping the last four characters
pub fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
