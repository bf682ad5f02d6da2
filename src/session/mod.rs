//! Session persistence and the authorization predicate shared by every
//! protected command. The stored record holds a bearer token; it must never be
//! logged.

mod guard;
mod store;

pub use guard::{current_role, is_authenticated, read_session, require_auth, Surface};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoreError};
