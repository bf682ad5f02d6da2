//! OTP-gated signup and signin.
//!
//! [`controller::AuthSessionController`] owns the per-purpose flow state and
//! talks to the server through [`client::AuthApi`]. Credential and token
//! payloads in [`types`] must never be logged.

pub mod client;
pub mod controller;
pub mod error;
pub mod observer;
pub mod types;

pub use client::{AuthApi, HttpAuthApi};
pub use controller::{AuthSessionController, Verified};
pub use error::{ApiError, AuthError, ChallengeOutcome};
pub use observer::{AuthObserver, FlowView, NoopObserver, Notice, NoticeLevel, RecordingObserver};
pub use types::{Credentials, OtpChallenge, OtpPurpose, OtpRequestId, Role, Session};
