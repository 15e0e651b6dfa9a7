//! Start command - interactive dashboard
//!
//! Renders the current screen, offers the screen's actions as a menu and runs
//! the chosen one. Session changes land through the session controller, so
//! after logging in or out the loop waits for the state to catch up before
//! drawing again.

use std::time::Duration;

use anyhow::Result;
use dialoguer::{Input, Password, Select};
use tracing::debug;

use super::{get_context, prompt};
use crate::output;
use quote_journal_core::view::{Action, Screen, JOURNAL_PLACEHOLDER};
use quote_journal_core::{QuoteJournalContext, SaveReceipt};

pub async fn run(force_demo: bool) -> Result<()> {
    if atty::isnt(atty::Stream::Stdin) {
        anyhow::bail!("The dashboard needs an interactive terminal. Try 'qj quote' instead.");
    }

    let mut ctx = get_context(force_demo)?;
    if ctx.config.demo_mode {
        output::info("Demo mode: accounts and entries are kept in memory until you quit.");
    }

    let bar = output::spinner("Fetching quote...");
    ctx.mount().await;
    bar.finish_and_clear();

    loop {
        let screen = ctx.screen();
        match &screen {
            Screen::Login => output::title(),
            Screen::Dashboard(dashboard) => output::dashboard(dashboard),
        }

        let actions = screen.actions();
        let labels: Vec<&str> = actions.iter().map(Action::label).collect();
        let choice = prompt(|| {
            Select::new()
                .with_prompt("Choose an action")
                .items(&labels)
                .default(0)
                .interact()
        })?;

        let action = actions[choice];
        debug!(?action, "Menu action");
        if action == Action::Quit {
            break;
        }
        perform(&ctx, action, &screen).await?;
    }

    ctx.unmount();
    Ok(())
}

/// How long to wait for a session change to reach the state
fn settle_timeout(ctx: &QuoteJournalContext) -> Duration {
    ctx.config.http_timeout * 2
}

async fn perform(ctx: &QuoteJournalContext, action: Action, screen: &Screen) -> Result<()> {
    match action {
        Action::LogIn | Action::SignUp => authenticate(ctx, action).await?,
        Action::NewQuote => {
            let bar = output::spinner("Fetching quote...");
            ctx.quote_service.fetch_quote().await;
            bar.finish_and_clear();
        }
        Action::SaveQuote => {
            let bar = output::spinner("Saving quote...");
            let result = ctx.collection_sync.save_quote().await;
            bar.finish_and_clear();
            report(result);
        }
        Action::SaveFavorite => {
            let bar = output::spinner("Saving favorite...");
            let result = ctx.collection_sync.save_favorite().await;
            bar.finish_and_clear();
            report(result);
        }
        Action::WriteJournal => {
            let draft = ctx.state.read(|s| s.journal_draft.clone());
            let text: String = prompt(|| {
                Input::new()
                    .with_prompt(JOURNAL_PLACEHOLDER)
                    .with_initial_text(draft)
                    .allow_empty(true)
                    .interact_text()
            })?;
            ctx.set_journal_draft(text);

            let bar = output::spinner("Saving journal entry...");
            let result = ctx.collection_sync.save_journal().await;
            bar.finish_and_clear();
            report(result);
        }
        Action::ShowFavorites => {
            if let Screen::Dashboard(dashboard) = screen {
                output::favorites(dashboard);
                tokio::task::block_in_place(output::pause);
            }
        }
        Action::LogOut => {
            if let Err(e) = ctx.auth_service.log_out().await {
                alert(&e.to_string(), true);
                return Ok(());
            }
            let bar = output::spinner("Logging out...");
            ctx.wait_for(|s| !s.is_logged_in(), settle_timeout(ctx)).await;
            bar.finish_and_clear();
        }
        Action::Quit => {}
    }
    Ok(())
}

async fn authenticate(ctx: &QuoteJournalContext, action: Action) -> Result<()> {
    let email: String = prompt(|| Input::new().with_prompt("Email").interact_text())?;
    let password: String = prompt(|| Password::new().with_prompt("Password").interact())?;

    let result = if action == Action::SignUp {
        ctx.auth_service.sign_up(&email, &password).await
    } else {
        ctx.auth_service.log_in(&email, &password).await
    };

    match result {
        Ok(user) => {
            let bar = output::spinner("Loading your journal...");
            let settled = ctx
                .wait_for(
                    |s| s.uid() == Some(user.uid.as_str()) && s.is_settled(),
                    settle_timeout(ctx),
                )
                .await;
            bar.finish_and_clear();
            if !settled {
                output::warning("Still loading your journal; lists will fill in shortly.");
            }
        }
        Err(e) => alert(&e.to_string(), true),
    }
    Ok(())
}

fn report(result: quote_journal_core::domain::result::Result<SaveReceipt>) {
    match result {
        Ok(receipt) => {
            if let Some(notice) = receipt.notice() {
                alert(notice, false);
            }
        }
        Err(e) => alert(&e.to_string(), true),
    }
}

fn alert(msg: &str, is_error: bool) {
    tokio::task::block_in_place(|| output::alert(msg, is_error));
}
