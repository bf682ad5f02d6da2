//! Interactive code entry for a pending challenge.

use crate::auth::{
    AuthApi, AuthError, AuthObserver, AuthSessionController, Notice, OtpPurpose, Verified,
};
use crate::session::SessionStore;
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

/// One line of user input while a challenge is pending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Code(String),
    Resend,
    /// Abandon the challenge and go back to editing credentials.
    Change,
}

impl Step {
    /// `None` for blank lines.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => None,
            "resend" | "r" => Some(Self::Resend),
            "change" | "cancel" | "c" => Some(Self::Change),
            _ => Some(Self::Code(line.to_string())),
        }
    }
}

/// How the prompt loop ended.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Verified(Verified),
    /// The user chose to change details, or input ended.
    Abandoned,
}

/// Reads lines until the challenge is verified, reset by the server, or abandoned.
///
/// Wrong codes, failed resends and network errors keep the loop going; the
/// observer has already told the user about them.
///
/// A line that is not valid UTF-8 is reported and skipped.
///
/// # Errors
/// Returns the challenge error when the server expired or forgot the request,
/// `AuthError::Input` when reading fails (the challenge is dropped), or any
/// error that is not a per-attempt failure.
pub async fn run_challenge<A, S, O, R, W>(
    controller: &mut AuthSessionController<A, S, O>,
    purpose: OtpPurpose,
    input: &mut R,
    prompt: &mut W,
) -> Result<Outcome, AuthError>
where
    A: AuthApi,
    S: SessionStore,
    O: AuthObserver,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut line = String::new();
    loop {
        let _ = write!(prompt, "Enter the code (or 'resend', 'change'): ");
        let _ = prompt.flush();

        line.clear();
        match input.read_line(&mut line).await {
            Ok(0) => {
                debug!("input closed, abandoning challenge");
                controller.cancel(purpose);
                return Ok(Outcome::Abandoned);
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                warn!("skipping unreadable input line: {err}");
                controller
                    .observer_mut()
                    .notice(&Notice::err("Invalid input", "Input is not valid UTF-8"));
                continue;
            }
            Err(err) => {
                warn!("failed to read input: {err}");
                controller.cancel(purpose);
                return Err(AuthError::Input(err));
            }
        }

        let Some(step) = Step::parse(&line) else {
            continue;
        };

        match step {
            Step::Change => {
                controller.cancel(purpose);
                return Ok(Outcome::Abandoned);
            }
            Step::Resend => match controller.resend(purpose).await {
                Ok(_) | Err(AuthError::Network(_) | AuthError::Validation(_)) => {}
                Err(err) => return Err(err),
            },
            Step::Code(code) => match controller.verify(purpose, &code).await {
                Ok(verified) => return Ok(Outcome::Verified(verified)),
                Err(AuthError::Challenge { outcome, .. }) if !outcome.resets_flow() => {}
                Err(AuthError::Network(_)) => {}
                Err(err) => return Err(err),
            },
        }
    }
}

/// Prompts for a password without echo.
///
/// # Errors
/// Returns an error if the terminal cannot be read or the password is empty.
pub fn read_password() -> Result<SecretString> {
    let password = rpassword::prompt_password("Password: ").context("failed to read password")?;
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    Ok(SecretString::from(password))
}
