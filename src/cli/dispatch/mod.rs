//! Maps validated CLI matches to an [`Action`].

use crate::cli::actions::{signin, signup, Action};
use crate::cli::commands::{auth, ARG_API_URL, ARG_SESSION_FILE, ARG_TIMEOUT};
use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// # Errors
/// Returns an error if the subcommand or its required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = GlobalArgs {
        api_url: matches.get_one::<String>(ARG_API_URL).cloned(),
        session_file: matches.get_one::<PathBuf>(ARG_SESSION_FILE).cloned(),
        timeout_seconds: matches.get_one::<u64>(ARG_TIMEOUT).copied(),
    };

    let (name, sub) = matches.subcommand().context("missing subcommand")?;

    match name {
        "signup" => {
            let options = auth::Options::parse(sub)?;
            Ok(Action::Signup(signup::Args {
                globals,
                username: options.username,
                email: options
                    .email
                    .context("missing required argument: --email")?,
                role: options.role,
                password: options.password,
            }))
        }
        "signin" => {
            let options = auth::Options::parse(sub)?;
            Ok(Action::Signin(signin::Args {
                globals,
                username: options.username,
                password: options.password,
            }))
        }
        "logout" => Ok(Action::Logout(globals)),
        "whoami" => Ok(Action::Whoami(globals)),
        "files" => Ok(Action::Files(globals)),
        "logs" => Ok(Action::Logs(globals)),
        other => Err(anyhow::anyhow!("unknown subcommand: {other}")),
    }
}
