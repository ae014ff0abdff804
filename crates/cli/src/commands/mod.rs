//! Command implementations.
//!
//! Commands print their results to stdout; diagnostics go through `tracing`
//! to stderr.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use cartwheel_client::{ApiError, ConfigError};
use secrecy::SecretString;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A store or backend operation failed.
    #[error(transparent)]
    Client(#[from] cartwheel_client::Error),

    /// The command needs a signed-in session.
    #[error("Not signed in. Run `cw login` first.")]
    NotSignedIn,

    /// The command needs an admin account.
    #[error("This command requires an admin account")]
    NotAdmin,

    /// A destructive command was not confirmed.
    #[error("Refusing to {0} without --yes")]
    NotConfirmed(&'static str),

    /// Payment went through but the order was not recorded.
    #[error("Payment confirmed, but the order was not saved: {0}")]
    OrderNotSaved(String),

    /// Reading input from stdin failed.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        Self::Client(err.into())
    }
}

/// Use the password given on the command line, or read one line from stdin.
async fn password_or_stdin(arg: Option<String>) -> Result<SecretString, CliError> {
    if let Some(password) = arg {
        return Ok(SecretString::from(password));
    }
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(SecretString::from(
        line.trim_end_matches(['\r', '\n']).to_string(),
    ))
}
