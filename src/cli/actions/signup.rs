use crate::auth::{AuthSessionController, Credentials, HttpAuthApi, OtpPurpose};
use crate::cli::{
    globals::GlobalArgs,
    prompt::{self, Outcome},
    render::TerminalObserver,
};
use crate::session::FileSessionStore;
use anyhow::{bail, Result};
use secrecy::SecretString;
use tokio::io::BufReader;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub username: String,
    pub email: String,
    pub role: Option<String>,
    pub password: Option<SecretString>,
}

/// Registers an account. A verified signup does not sign the user in.
///
/// # Errors
/// Returns an error if the request is rejected, the challenge expires or the
/// user abandons it.
pub async fn execute(args: Args) -> Result<()> {
    let config = args.globals.config()?;
    let store = FileSessionStore::new(config.session_file.clone());
    let api = HttpAuthApi::new(config)?;
    let mut controller = AuthSessionController::new(api, store, TerminalObserver::stderr());

    let password = match args.password {
        Some(password) => password,
        None => prompt::read_password()?,
    };
    let credentials = Credentials::signup(args.username, args.email, password, args.role);

    controller.submit(OtpPurpose::Signup, credentials).await?;

    let mut input = BufReader::new(tokio::io::stdin());
    let outcome = prompt::run_challenge(
        &mut controller,
        OtpPurpose::Signup,
        &mut input,
        &mut std::io::stderr(),
    )
    .await?;

    match outcome {
        Outcome::Verified(_) => {
            info!("account created");
            println!("Account created. Run `vaultgate signin` to continue.");
            Ok(())
        }
        Outcome::Abandoned => bail!("signup cancelled; run it again to change details"),
    }
}
