use crate::auth::{AuthSessionController, HttpAuthApi, NoopObserver};
use crate::cli::globals::GlobalArgs;
use crate::session::{require_auth, FileSessionStore, Surface};
use anyhow::{bail, Result};

/// # Errors
/// Returns an error if the session file cannot be removed.
pub fn logout(globals: &GlobalArgs) -> Result<()> {
    let config = globals.config()?;
    let store = FileSessionStore::new(config.session_file.clone());
    let mut controller = AuthSessionController::new(HttpAuthApi::new(config)?, store, NoopObserver);

    controller.logout()?;
    println!("Signed out");

    Ok(())
}

/// # Errors
/// Returns an error if nobody is signed in.
pub fn whoami(globals: &GlobalArgs) -> Result<()> {
    let config = globals.config()?;
    let store = FileSessionStore::new(config.session_file);

    match require_auth(&store) {
        Ok(session) => {
            println!("{}", describe(&session.username, &session.role));
            Ok(())
        }
        Err(_) => bail!("not signed in; run `vaultgate signin`"),
    }
}

fn describe(username: &str, role: &crate::auth::Role) -> String {
    let surface = match Surface::for_role(role) {
        Surface::Admin => "admin console",
        Surface::Dashboard | Surface::SignIn => "dashboard",
    };
    format!("{username}\t{role}\t{surface}")
}
