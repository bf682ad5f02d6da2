use crate::auth::AuthError;
use crate::cli::{globals::GlobalArgs, render::TerminalObserver};
use crate::session::FileSessionStore;
use crate::vault::{AuthorizedClient, FileMetadata};
use anyhow::{bail, Result};

/// Lists files visible to the signed-in user.
///
/// # Errors
/// Returns an error if there is no valid session or the request fails.
pub async fn execute(globals: &GlobalArgs) -> Result<()> {
    let config = globals.config()?;
    let store = FileSessionStore::new(config.session_file.clone());
    let mut client = AuthorizedClient::new(config, store, TerminalObserver::stderr())?;

    match client.list_files().await {
        Ok(files) => {
            if files.is_empty() {
                println!("No files");
            }
            for file in &files {
                println!("{}", row(file));
            }
            Ok(())
        }
        Err(AuthError::SessionInvalid) => {
            bail!("session expired or missing; run `vaultgate signin`")
        }
        Err(err) => Err(err.into()),
    }
}

fn row(file: &FileMetadata) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        file.id,
        file.file_name,
        file.owner_username.as_deref().unwrap_or("-"),
        file.size_bytes,
        file.upload_timestamp.as_deref().unwrap_or("-"),
        file.visibility_type.as_deref().unwrap_or("-"),
    )
}
