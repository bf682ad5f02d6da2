use crate::auth::types::OtpPurpose;
use crate::session::StoreError;
use thiserror::Error;

/// What a rejected verify means for the pending challenge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Wrong code; the challenge is still usable.
    Retry,
    Expired,
    NotFound,
}

impl ChallengeOutcome {
    /// Classifies a server rejection message.
    ///
    /// The API only returns free text, so this matches substrings
    /// case-insensitively. Replace with a structured code once the response
    /// envelope carries one.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("expired") {
            Self::Expired
        } else if lowered.contains("not found") {
            Self::NotFound
        } else {
            Self::Retry
        }
    }

    /// Whether the challenge must be dropped and the flow returned to idle.
    #[must_use]
    pub const fn resets_flow(self) -> bool {
        matches!(self, Self::Expired | Self::NotFound)
    }
}

/// Transport-level failures returned by API clients.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Request unauthorized ({status})")]
    Unauthorized { status: u16 },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Config error: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials rejected on submit; the flow stays idle.
    #[error("{0}")]
    Validation(String),
    /// Code rejected on verify.
    #[error("OTP verification failed: {message}")]
    Challenge {
        message: String,
        outcome: ChallengeOutcome,
    },
    #[error("Session is missing or no longer valid")]
    SessionInvalid,
    /// The session is fine but its role may not use the resource.
    #[error("Access denied")]
    AccessDenied,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("An OTP challenge is already pending for {0}")]
    ChallengePending(OtpPurpose),
    #[error("No OTP challenge is pending for {0}")]
    NoChallenge(OtpPurpose),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

impl AuthError {
    /// Maps failures that are not request/verify rejections.
    pub(crate) fn from_transport(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { message, .. } => Self::Validation(message),
            ApiError::Unauthorized { .. } => Self::SessionInvalid,
            ApiError::Network(message) => Self::Network(message),
            ApiError::Parse(message) => Self::Parse(message),
            ApiError::Config(message) => Self::Config(message),
        }
    }
}
