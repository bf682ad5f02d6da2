use crate::auth::{AuthSessionController, Credentials, HttpAuthApi, OtpPurpose, Verified};
use crate::cli::{
    globals::GlobalArgs,
    prompt::{self, Outcome},
    render::TerminalObserver,
};
use crate::session::{FileSessionStore, Surface};
use anyhow::{bail, Result};
use secrecy::SecretString;
use tokio::io::BufReader;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub username: String,
    pub password: Option<SecretString>,
}

/// Signs in and persists the session.
///
/// # Errors
/// Returns an error if the credentials are rejected, the challenge expires,
/// the user abandons it or the session cannot be stored.
pub async fn execute(args: Args) -> Result<()> {
    let config = args.globals.config()?;
    let store = FileSessionStore::new(config.session_file.clone());
    let api = HttpAuthApi::new(config)?;
    let mut controller = AuthSessionController::new(api, store, TerminalObserver::stderr());

    let password = match args.password {
        Some(password) => password,
        None => prompt::read_password()?,
    };

    controller
        .submit(OtpPurpose::Signin, Credentials::signin(args.username, password))
        .await?;

    let mut input = BufReader::new(tokio::io::stdin());
    let outcome = prompt::run_challenge(
        &mut controller,
        OtpPurpose::Signin,
        &mut input,
        &mut std::io::stderr(),
    )
    .await?;

    match outcome {
        Outcome::Verified(Verified::Session { session, surface }) => {
            println!("Signed in as {} ({})", session.username, session.role);
            if surface == Surface::Admin {
                println!("Admin console available");
            }
            println!(
                "Session stored in {}",
                controller.store().path().display()
            );
            Ok(())
        }
        Outcome::Verified(Verified::Account) => Ok(()),
        Outcome::Abandoned => bail!("sign in cancelled; run it again to change details"),
    }
}
