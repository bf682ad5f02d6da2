//! # Vaultgate (OTP-gated session client for the file vault)
//!
//! `vaultgate` signs users in to the file vault REST API through a one-time
//! passcode challenge and keeps the resulting session on disk so later commands
//! can call the API on the user's behalf.
//!
//! ## Authentication flow
//!
//! Both signup and signin submit credentials first. The server answers with an
//! `otpRequestId` and emails a code; the client then verifies the code against
//! that id. While a challenge is pending the credentials are locked: a second
//! submit is rejected, `resend` replaces the id, and `change details` drops the
//! challenge locally without telling the server.
//!
//! A verified signin yields `{token, username, role}`, persisted through a
//! [`session::SessionStore`]. A verified signup only creates the account; the
//! user must sign in separately.
//!
//! ## Authorization
//!
//! Every protected command goes through [`session::require_auth`]. Authenticated
//! requests attach the bearer token and tear the session down on `401`/`403`.
//! Role checks on this side are display gates only; the server is the real
//! authorization boundary.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod session;
pub mod vault;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
