//! `dialer`: operator command line.
//!
//! One-shot subcommands for session and endpoint management, plus an
//! interactive keypad (`dialer run`) that submits every complete number.

#![deny(unsafe_code)]

mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialer_client::{Dialer, SubmissionOutcome, WsTransport};
use dialer_settings::DialerSettings;
use dialer_store::{JsonFileStore, KeyValueStore};

#[derive(Debug, Parser)]
#[command(name = "dialer", about = "Look up a phone number and push it to the relay socket")]
struct Cli {
    /// Settings file (default: ~/.dialer/settings.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and persist the session.
    Login {
        /// Admin username.
        #[arg(long, short)]
        username: String,
        /// Admin password.
        #[arg(long, short)]
        password: String,
    },
    /// Forget the persisted session.
    Logout,
    /// Show session and endpoint.
    Status,
    /// Show the saved endpoint, or save and connect to a new one.
    Endpoint {
        /// New socket URL.
        url: Option<String>,
    },
    /// Submit one number (the 8 digits after 010).
    Submit {
        /// Digits; separators are ignored.
        digits: String,
    },
    /// Interactive keypad.
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    dialer_core::logging::init_subscriber(&settings.logging.level, settings.logging.json);

    let store_path = settings.storage.resolved_path();
    tracing::debug!(path = %store_path.display(), "opening store");
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(store_path));
    let dialer = Dialer::new(&settings, store, Arc::new(WsTransport::new()))
        .context("failed to initialize dialer")?;

    match cli.command {
        Command::Login { username, password } => {
            dialer
                .login(&username, &password)
                .await
                .context("login failed")?;
            println!("logged in");
        }
        Command::Logout => {
            dialer.logout().context("logout failed")?;
            println!("logged out");
        }
        Command::Status => {
            let logged_in = dialer.is_logged_in()?;
            println!("session:  {}", if logged_in { "logged in" } else { "logged out" });
            println!("endpoint: {}", dialer.saved_endpoint()?);
        }
        Command::Endpoint { url: None } => {
            println!("{}", dialer.saved_endpoint()?);
        }
        Command::Endpoint { url: Some(url) } => {
            let state = dialer
                .change_endpoint(&url)
                .await
                .context("failed to change endpoint")?;
            println!("saved {}; connection {state}", url.trim());
            dialer.shutdown();
        }
        Command::Submit { digits } => {
            require_login(&dialer)?;
            let state = dialer.start().await?;
            tracing::debug!(%state, "connection ready");
            let outcome = dialer.submit(&digits).await;
            dialer.shutdown();
            println!("{}", describe(&outcome));
            if !outcome.is_sent() {
                anyhow::bail!("submission failed: {}", outcome.label());
            }
        }
        Command::Run => {
            require_login(&dialer)?;
            interactive::run(&dialer).await?;
        }
    }

    Ok(())
}

fn load_settings(path: Option<&std::path::Path>) -> Result<DialerSettings> {
    match path {
        Some(path) => dialer_settings::load_settings_from_path(path)
            .with_context(|| format!("failed to load settings: {}", path.display())),
        None => dialer_settings::load_settings().context("failed to load settings"),
    }
}

fn require_login(dialer: &Dialer) -> Result<()> {
    if !dialer.is_logged_in()? {
        anyhow::bail!("not logged in; run `dialer login` first");
    }
    Ok(())
}

/// One-line operator message for an outcome.
pub(crate) fn describe(outcome: &SubmissionOutcome) -> String {
    match outcome {
        SubmissionOutcome::Sent(delivery) => {
            let name = delivery.user.name.as_deref().unwrap_or("unknown");
            format!("sent {} ({name})", delivery.suffix)
        }
        SubmissionOutcome::ValidationFailed(e) => format!("invalid number: {e}"),
        SubmissionOutcome::Unauthorized => "session expired or rejected; log in again".to_string(),
        SubmissionOutcome::UserNotFound => "no subscriber with that number".to_string(),
        SubmissionOutcome::EnrollmentNotFound => "subscriber has no enrollment".to_string(),
        SubmissionOutcome::SocketNotOpen(delivery) => format!(
            "found {} but the socket is not connected; check the endpoint",
            delivery.suffix
        ),
        SubmissionOutcome::NetworkError(e) => format!("lookup failed: {e}"),
        SubmissionOutcome::PersistenceError(e) => format!("storage error: {e}"),
    }
}
