pub mod files;
pub mod logs;
pub mod session;
pub mod signin;
pub mod signup;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Signup(signup::Args),
    Signin(signin::Args),
    Logout(GlobalArgs),
    Whoami(GlobalArgs),
    Files(GlobalArgs),
    Logs(GlobalArgs),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
