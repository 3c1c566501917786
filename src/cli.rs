//! `authgate` command line: drive a session against a live API from a shell.
//!
//! The credential and theme preference persist in a JSON file between runs,
//! standing in for browser local storage. Every command goes through the same
//! `Session` the browser build uses, so expiry handling and termination
//! behave identically.

use std::path::PathBuf;
use std::rc::Rc;

use authgate::router::navigation::MemoryNavigator;
use authgate::util::dark_mode::{self, ThemePreference};
use authgate::util::storage::{FileStore, StorageError};
use authgate::{RequestError, Session, SessionConfig, SessionError};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("not signed in; run `authgate login` first")]
    NotSignedIn,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "authgate", about = "Sign in, inspect and end API sessions")]
struct Cli {
    #[arg(long, env = "AUTHGATE_API_BASE_URL", default_value = "http://127.0.0.1:8000")]
    base_url: String,

    /// File holding the stored credential and preferences.
    #[arg(long, env = "AUTHGATE_STORE", default_value = ".authgate.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for a token and store it.
    Login {
        email: String,
        #[arg(long, env = "AUTHGATE_PASSWORD")]
        password: String,
    },
    /// Create an account. Does not sign in.
    Register {
        email: String,
        #[arg(long, env = "AUTHGATE_PASSWORD")]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Print the identity behind the stored token.
    Whoami,
    /// Forget the stored token.
    Logout,
    /// Print (or flip) the stored light/dark preference.
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = SessionConfig::from_env().with_base_url(&cli.base_url);
    let store = Rc::new(FileStore::open(&cli.store)?);
    let session = Session::builder(config)
        .store(store)
        .navigator(Rc::new(MemoryNavigator::new()))
        .build()?;

    match cli.command {
        Command::Login { email, password } => {
            let identity = session.login(&email, &password).await?;
            println!("signed in as {}", identity.email);
        }
        Command::Register { email, password, full_name } => {
            session.register(&email, &password, full_name.as_deref()).await?;
            println!("registered {email}");
        }
        Command::Whoami => {
            let identity = session.check_auth().await?.ok_or(CliError::NotSignedIn)?;
            println!("{}", serde_json::to_string_pretty(&identity)?);
        }
        Command::Logout => {
            session.logout().await;
            println!("signed out");
        }
        Command::Theme { toggle } => {
            let prefers_dark = dark_mode::system_prefers_dark();
            let preference: ThemePreference = if toggle {
                session.theme().toggle(prefers_dark)?
            } else {
                session.theme().read(prefers_dark)
            };
            println!("{}", preference.as_str());
        }
    }
    Ok(())
}
