use crate::auth::AuthError;
use crate::cli::{globals::GlobalArgs, render::TerminalObserver};
use crate::session::FileSessionStore;
use crate::vault::{AuditLogEntry, AuthorizedClient};
use anyhow::{bail, Result};

/// Prints the audit trail for admins and auditors.
///
/// # Errors
/// Returns an error if there is no valid session, the role may not read audit
/// logs, or the request fails.
pub async fn execute(globals: &GlobalArgs) -> Result<()> {
    let config = globals.config()?;
    let store = FileSessionStore::new(config.session_file.clone());
    let mut client = AuthorizedClient::new(config, store, TerminalObserver::stderr())?;

    match client.list_audit_logs().await {
        Ok(entries) => {
            if entries.is_empty() {
                println!("No audit entries");
            }
            for entry in &entries {
                println!("{}", row(entry));
            }
            Ok(())
        }
        Err(AuthError::SessionInvalid) => {
            bail!("session expired or missing; run `vaultgate signin`")
        }
        Err(AuthError::AccessDenied) => bail!("audit logs require an admin or auditor role"),
        Err(err) => Err(err.into()),
    }
}

fn row(entry: &AuditLogEntry) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        entry.id,
        entry.username.as_deref().unwrap_or("Unknown"),
        entry.action,
        entry.details.as_deref().unwrap_or("-"),
        entry.timestamp.as_deref().unwrap_or("-"),
    )
}
