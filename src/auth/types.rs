//! Request and response types for the OTP auth endpoints plus the session record.
//! Credentials and tokens pass through here, so `Debug` output redacts them.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{fmt, time::SystemTime};

/// Default role sent on signup when none is given.
pub const DEFAULT_SIGNUP_ROLE: &str = "user";

/// Server-issued id correlating an OTP code with the submission that triggered it.
///
/// The API returns a number today but the id is treated as opaque; whatever JSON
/// form arrives is echoed back unchanged on verify.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OtpRequestId {
    Number(u64),
    Text(String),
}

impl fmt::Display for OtpRequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(formatter, "{id}"),
            Self::Text(id) => formatter.write_str(id),
        }
    }
}

impl From<u64> for OtpRequestId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for OtpRequestId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OtpPurpose {
    Signup,
    Signin,
}

impl OtpPurpose {
    /// Label of the primary action while no challenge is pending.
    #[must_use]
    pub const fn idle_label(self) -> &'static str {
        match self {
            Self::Signup => "Create Account",
            Self::Signin => "Sign In",
        }
    }

    /// Label of the primary action while a challenge is pending.
    #[must_use]
    pub const fn pending_label(self) -> &'static str {
        "Verify OTP"
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signup => formatter.write_str("sign up"),
            Self::Signin => formatter.write_str("sign in"),
        }
    }
}

/// Credentials submitted to start a challenge. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl Credentials {
    #[must_use]
    pub fn signin(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
            email: None,
            role: None,
        }
    }

    #[must_use]
    pub fn signup(
        username: impl Into<String>,
        email: impl Into<String>,
        password: SecretString,
        role: Option<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password,
            email: Some(email.into()),
            role,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish()
    }
}

/// A live challenge. Held in memory only, one per purpose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtpChallenge {
    pub request_id: OtpRequestId,
    pub purpose: OtpPurpose,
    pub issued_at: SystemTime,
}

impl OtpChallenge {
    #[must_use]
    pub fn new(request_id: OtpRequestId, purpose: OtpPurpose) -> Self {
        Self {
            request_id,
            purpose,
            issued_at: SystemTime::now(),
        }
    }
}

/// Role carried by a session. The wire form is the server authority string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Admin,
    Auditor,
    Other(String),
}

impl Role {
    /// Parses `ROLE_ADMIN`, `admin`, `Admin`... Unknown values are kept verbatim.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let upper = trimmed.to_ascii_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(&upper) {
            "USER" => Self::User,
            "ADMIN" => Self::Admin,
            "AUDITOR" => Self::Auditor,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
            Self::Auditor => "ROLE_AUDITOR",
            Self::Other(role) => role,
        }
    }

    /// Admins and auditors see the admin surface. UX only; the API enforces access.
    #[must_use]
    pub const fn is_elevated(&self) -> bool {
        matches!(self, Self::Admin | Self::Auditor)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Durable proof of authentication, stored as `{token, username, role}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: Role,
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Serialize)]
pub(crate) struct SignupOtpRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

impl<'a> SignupOtpRequest<'a> {
    pub(crate) fn from_credentials(credentials: &'a Credentials) -> Self {
        Self {
            username: &credentials.username,
            email: credentials.email.as_deref().unwrap_or_default(),
            password: credentials.password.expose_secret(),
            role: credentials.role.as_deref().unwrap_or(DEFAULT_SIGNUP_ROLE),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct SigninOtpRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> SigninOtpRequest<'a> {
    pub(crate) fn from_credentials(credentials: &'a Credentials) -> Self {
        Self {
            username: &credentials.username,
            password: credentials.password.expose_secret(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OtpVerifyRequest<'a> {
    pub otp_request_id: &'a OtpRequestId,
    pub otp: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OtpRequestResponse {
    pub otp_request_id: OtpRequestId,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct JwtResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
}

impl From<JwtResponse> for Session {
    fn from(response: JwtResponse) -> Self {
        Self {
            token: response.token,
            username: response.username,
            role: response.role,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}
