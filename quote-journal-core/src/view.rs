//! View model
//!
//! `render` turns an `AppState` into the text a front end shows. It has no
//! side effects; front ends call it again after every state change.

use serde::Serialize;

use crate::state::AppState;

pub const APP_TITLE: &str = "Daily Quote Journal";
pub const JOURNAL_TITLE: &str = "Past Journal Entries";
pub const SAVED_TITLE: &str = "Saved Quotes";
pub const FAVORITES_TITLE: &str = "Favorites";
pub const NO_SAVED_QUOTES: &str = "No saved quotes yet.";
pub const JOURNAL_PLACEHOLDER: &str = "Write your thoughts...";

/// Local calendar date format for journal entries (month/day/year)
const DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Actions offered on a screen, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    LogIn,
    SignUp,
    NewQuote,
    SaveQuote,
    SaveFavorite,
    WriteJournal,
    ShowFavorites,
    LogOut,
    Quit,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::LogIn => "Log In",
            Action::SignUp => "Sign Up",
            Action::NewQuote => "New Quote",
            Action::SaveQuote => "❤︎ Save Quote",
            Action::SaveFavorite => "Save Favorite",
            Action::WriteJournal => "Save Journal Entry",
            Action::ShowFavorites => "Show Favorites",
            Action::LogOut => "Log Out",
            Action::Quit => "Quit",
        }
    }
}

const LOGIN_ACTIONS: &[Action] = &[Action::LogIn, Action::SignUp, Action::Quit];

const DASHBOARD_ACTIONS: &[Action] = &[
    Action::NewQuote,
    Action::SaveQuote,
    Action::SaveFavorite,
    Action::WriteJournal,
    Action::ShowFavorites,
    Action::LogOut,
    Action::Quit,
];

/// One journal entry as shown in the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalItem {
    /// Local date of creation; absent when the entry has no timestamp
    pub date_line: Option<String>,
    pub quote_line: String,
    pub entry_line: String,
}

/// Authenticated screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub user_email: Option<String>,
    pub quote_line: String,
    pub journal_draft: String,
    pub journal: Vec<JournalItem>,
    pub saved_quotes: Vec<String>,
    pub favorites: Vec<String>,
    /// A refresh triggered by the session is still running
    pub syncing: bool,
}

impl Dashboard {
    /// Placeholder shown in place of an empty saved-quotes list
    pub fn saved_quotes_placeholder(&self) -> Option<&'static str> {
        self.saved_quotes.is_empty().then_some(NO_SAVED_QUOTES)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "lowercase")]
pub enum Screen {
    Login,
    Dashboard(Dashboard),
}

impl Screen {
    pub fn actions(&self) -> &'static [Action] {
        match self {
            Screen::Login => LOGIN_ACTIONS,
            Screen::Dashboard(_) => DASHBOARD_ACTIONS,
        }
    }
}

pub fn render(state: &AppState) -> Screen {
    let Some(session) = &state.session else {
        return Screen::Login;
    };

    let journal = state
        .journal_entries
        .iter()
        .map(|entry| JournalItem {
            date_line: entry
                .local_date()
                .map(|date| date.format(DATE_FORMAT).to_string()),
            quote_line: format!("Quote: \"{}\"", entry.quote),
            entry_line: format!("Entry: {}", entry.entry),
        })
        .collect();

    let saved_quotes = state
        .saved_quotes
        .iter()
        .map(|q| format!("\"{}\" — {}", q.quote, q.author))
        .collect();

    let favorites = state
        .favorites
        .iter()
        .map(|f| format!("\"{}\"", f.quote))
        .collect();

    Screen::Dashboard(Dashboard {
        user_email: session.email.clone(),
        quote_line: format!("\"{}\"", state.quote_text),
        journal_draft: state.journal_draft.clone(),
        journal,
        saved_quotes,
        favorites,
        syncing: state.sync_in_flight > 0,
    })
}
