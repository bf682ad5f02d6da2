use crate::auth::types::{Role, Session};
use crate::session::store::{SessionStore, StoreError};
use tracing::warn;

/// Where the user should land after an auth decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    /// Unauthenticated entry point.
    SignIn,
    Dashboard,
    /// Admin/audit console.
    Admin,
}

impl Surface {
    /// Landing surface after signin.
    #[must_use]
    pub const fn for_role(role: &Role) -> Self {
        if role.is_elevated() {
            Self::Admin
        } else {
            Self::Dashboard
        }
    }
}

/// Reads the stored session without side effects. Corrupt records read as `None`.
///
/// # Errors
/// Returns an error if the store cannot be read.
pub fn read_session(store: &impl SessionStore) -> Result<Option<Session>, StoreError> {
    Ok(store
        .read_raw()?
        .and_then(|raw| serde_json::from_str::<Session>(&raw).ok()))
}

/// True iff the store holds a parseable session.
pub fn is_authenticated(store: &impl SessionStore) -> bool {
    matches!(read_session(store), Ok(Some(_)))
}

pub fn current_role(store: &impl SessionStore) -> Option<Role> {
    read_session(store).ok().flatten().map(|session| session.role)
}

/// Guard for protected commands: the session, or the surface to redirect to.
///
/// A corrupt record is erased before redirecting, and an unreadable store
/// redirects too, so the guard never lets an unknown state through.
///
/// # Errors
/// Returns `Surface::SignIn` when no valid session exists.
pub fn require_auth(store: &impl SessionStore) -> Result<Session, Surface> {
    let raw = match store.read_raw() {
        Ok(Some(raw)) => raw,
        Ok(None) => return Err(Surface::SignIn),
        Err(err) => {
            warn!("session store unreadable: {err}");
            return Err(Surface::SignIn);
        }
    };

    match serde_json::from_str::<Session>(&raw) {
        Ok(session) => Ok(session),
        Err(err) => {
            warn!("discarding corrupt session record: {err}");
            if let Err(err) = store.erase() {
                warn!("failed to erase corrupt session record: {err}");
            }
            Err(Surface::SignIn)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemorySessionStore;

    const VALID: &str = r#"{"token":"t","username":"a","role":"ROLE_AUDITOR"}"#;

    #[test]
    fn empty_store_is_unauthenticated() {
        let store = MemorySessionStore::new();
        assert!(!is_authenticated(&store));
        assert_eq!(current_role(&store), None);
        assert_eq!(require_auth(&store), Err(Surface::SignIn));
    }

    #[test]
    fn valid_record_authenticates() {
        let store = MemorySessionStore::with_raw(VALID);
        assert!(is_authenticated(&store));
        assert_eq!(current_role(&store), Some(Role::Auditor));

        let session = require_auth(&store).expect("session");
        assert_eq!(session.username, "a");
        assert_eq!(Surface::for_role(&session.role), Surface::Admin);
    }

    #[test]
    fn corrupt_record_is_cleared_and_redirects() -> anyhow::Result<()> {
        let store = MemorySessionStore::with_raw(r#"{"token": 12"#);
        assert!(!is_authenticated(&store));
        // read-only predicates leave the record alone
        assert!(store.read_raw()?.is_some());

        assert_eq!(require_auth(&store), Err(Surface::SignIn));
        assert_eq!(store.read_raw()?, None);
        Ok(())
    }

    #[test]
    fn record_missing_fields_is_corrupt() {
        let store = MemorySessionStore::with_raw(r#"{"username":"a"}"#);
        assert_eq!(require_auth(&store), Err(Surface::SignIn));
        assert!(!is_authenticated(&store));
    }

    #[test]
    fn landing_surface_follows_role() {
        assert_eq!(Surface::for_role(&Role::Admin), Surface::Admin);
        assert_eq!(Surface::for_role(&Role::Auditor), Surface::Admin);
        assert_eq!(Surface::for_role(&Role::User), Surface::Dashboard);
        assert_eq!(
            Surface::for_role(&Role::Other("ROLE_GUEST".to_string())),
            Surface::Dashboard
        );
    }
}
