//! OTP flow state machine.
//!
//! Each purpose (signup, signin) is either `Idle` or `OtpPending`. Transition
//! methods take `&mut self`, so one controller never has two requests in
//! flight, and a submit while a challenge is pending is refused outright.

use crate::auth::{
    client::AuthApi,
    error::{ApiError, AuthError, ChallengeOutcome},
    observer::{AuthObserver, FlowView, Notice},
    types::{Credentials, OtpChallenge, OtpPurpose, OtpRequestId, Role, Session},
};
use crate::session::{self, SessionStore, Surface};
use tracing::{debug, info, instrument, warn};

enum FlowState {
    Idle,
    OtpPending {
        challenge: OtpChallenge,
        // kept so resend can re-submit while the inputs are locked
        credentials: Credentials,
    },
}

impl FlowState {
    const fn challenge(&self) -> Option<&OtpChallenge> {
        match self {
            Self::Idle => None,
            Self::OtpPending { challenge, .. } => Some(challenge),
        }
    }
}

/// Result of a successful verify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verified {
    /// Signup verified; the account exists but the user must sign in.
    Account,
    /// Signin verified; the session has been persisted.
    Session { session: Session, surface: Surface },
}

impl Verified {
    #[must_use]
    pub const fn surface(&self) -> Surface {
        match self {
            Self::Account => Surface::SignIn,
            Self::Session { surface, .. } => *surface,
        }
    }
}

/// Drives signup/signin through an OTP challenge and owns the session lifecycle.
///
/// One instance per run; challenges live only as long as the controller.
pub struct AuthSessionController<A, S, O> {
    api: A,
    store: S,
    observer: O,
    signup: FlowState,
    signin: FlowState,
}

impl<A, S, O> AuthSessionController<A, S, O>
where
    A: AuthApi,
    S: SessionStore,
    O: AuthObserver,
{
    pub fn new(api: A, store: S, observer: O) -> Self {
        Self {
            api,
            store,
            observer,
            signup: FlowState::Idle,
            signin: FlowState::Idle,
        }
    }

    /// The live challenge for `purpose`, if any.
    pub fn challenge(&self, purpose: OtpPurpose) -> Option<&OtpChallenge> {
        self.slot(purpose).challenge()
    }

    pub fn view(&self, purpose: OtpPurpose) -> FlowView {
        match self.challenge(purpose) {
            Some(challenge) => FlowView::pending(purpose, challenge.request_id.clone()),
            None => FlowView::idle(purpose),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        session::is_authenticated(&self.store)
    }

    pub fn current_role(&self) -> Option<Role> {
        session::current_role(&self.store)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Submits credentials and opens a challenge: `Idle -> OtpPending`.
    ///
    /// # Errors
    /// `ChallengePending` if one is already live for `purpose`, otherwise the
    /// mapped API failure. The flow stays idle on error.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn submit(
        &mut self,
        purpose: OtpPurpose,
        credentials: Credentials,
    ) -> Result<OtpChallenge, AuthError> {
        if self.challenge(purpose).is_some() {
            warn!("submit ignored: {purpose} challenge already pending");
            return Err(AuthError::ChallengePending(purpose));
        }

        let result = request_otp(&self.api, purpose, &credentials).await;
        match result {
            Ok(request_id) => {
                let challenge = OtpChallenge::new(request_id, purpose);
                let sent = sent_message(purpose, &credentials);
                info!("{purpose} challenge {} opened", challenge.request_id);

                *self.slot_mut(purpose) = FlowState::OtpPending {
                    challenge: challenge.clone(),
                    credentials,
                };
                self.publish(purpose);
                self.observer.notice(&Notice::ok("OTP sent", sent));

                Ok(challenge)
            }
            Err(err) => Err(self.failed(submit_failure_title(purpose), err)),
        }
    }

    /// Requests a fresh code. The new request id replaces the held one; the
    /// server is not told about the old one.
    ///
    /// # Errors
    /// `NoChallenge` when idle, otherwise the mapped API failure. A failed
    /// resend keeps the existing challenge.
    #[instrument(skip(self))]
    pub async fn resend(&mut self, purpose: OtpPurpose) -> Result<OtpChallenge, AuthError> {
        let result = match self.slot(purpose) {
            FlowState::OtpPending { credentials, .. } => {
                request_otp(&self.api, purpose, credentials).await
            }
            FlowState::Idle => return Err(AuthError::NoChallenge(purpose)),
        };

        match result {
            Ok(request_id) => {
                let fresh = OtpChallenge::new(request_id, purpose);
                let sent = match self.slot_mut(purpose) {
                    FlowState::OtpPending {
                        challenge,
                        credentials,
                    } => {
                        debug!(
                            "{purpose} challenge {} superseded by {}",
                            challenge.request_id, fresh.request_id
                        );
                        *challenge = fresh.clone();
                        sent_message(purpose, credentials)
                    }
                    FlowState::Idle => return Err(AuthError::NoChallenge(purpose)),
                };
                self.publish(purpose);
                self.observer.notice(&Notice::ok("OTP resent", sent));

                Ok(fresh)
            }
            Err(err) => Err(self.failed("Resend failed", err)),
        }
    }

    /// Verifies `code` against the live challenge.
    ///
    /// # Errors
    /// `NoChallenge` when idle. A rejected code yields `AuthError::Challenge`;
    /// when its outcome is expired/not-found the flow has already been reset.
    /// Transport failures leave the flow untouched.
    #[instrument(skip(self, code))]
    pub async fn verify(&mut self, purpose: OtpPurpose, code: &str) -> Result<Verified, AuthError> {
        let request_id = match self.challenge(purpose) {
            Some(challenge) => challenge.request_id.clone(),
            None => return Err(AuthError::NoChallenge(purpose)),
        };
        let code = code.trim();

        match purpose {
            OtpPurpose::Signup => match self.api.verify_signup_otp(&request_id, code).await {
                Ok(()) => {
                    info!("signup challenge {request_id} verified");
                    self.reset(purpose);
                    self.observer
                        .notice(&Notice::ok("Account verified", "Please sign in to continue"));
                    self.observer.redirect(Surface::SignIn);
                    Ok(Verified::Account)
                }
                Err(err) => Err(self.verify_failed(purpose, &request_id, err)),
            },
            OtpPurpose::Signin => match self.api.verify_signin_otp(&request_id, code).await {
                Ok(session) => {
                    info!("signin challenge {request_id} verified");
                    // the code is spent server-side even if persisting fails
                    self.reset(purpose);
                    if let Err(err) = self.store.save(&session) {
                        self.observer
                            .notice(&Notice::err("Sign in failed", err.to_string()));
                        return Err(err.into());
                    }

                    let surface = Surface::for_role(&session.role);
                    self.observer.notice(&Notice::ok(
                        "Signed in",
                        format!("Welcome, {}", session.username),
                    ));
                    self.observer.redirect(surface);
                    Ok(Verified::Session { session, surface })
                }
                Err(err) => Err(self.verify_failed(purpose, &request_id, err)),
            },
        }
    }

    /// "Change details": drops the challenge locally. Always succeeds.
    pub fn cancel(&mut self, purpose: OtpPurpose) {
        if let Some(challenge) = self.challenge(purpose) {
            debug!("{purpose} challenge {} abandoned", challenge.request_id);
        }
        self.reset(purpose);
    }

    /// Clears the stored session and sends the user to the entry point.
    ///
    /// # Errors
    /// Returns an error if the store cannot be erased.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.store.erase()?;
        info!("session cleared");
        self.observer.redirect(Surface::SignIn);
        Ok(())
    }

    fn verify_failed(
        &mut self,
        purpose: OtpPurpose,
        request_id: &OtpRequestId,
        err: ApiError,
    ) -> AuthError {
        match err {
            ApiError::Rejected { message, .. } => {
                let outcome = ChallengeOutcome::classify(&message);
                warn!("{purpose} challenge {request_id} rejected: {outcome:?}");
                self.observer.notice(&Notice::err("OTP failed", message.clone()));
                if outcome.resets_flow() {
                    self.reset(purpose);
                }
                AuthError::Challenge { message, outcome }
            }
            other => self.failed("OTP failed", other),
        }
    }

    /// Reports a failure that leaves the flow as it was.
    fn failed(&mut self, title: &str, err: ApiError) -> AuthError {
        let err = AuthError::from_transport(err);
        let (title, message) = match &err {
            AuthError::Network(message) => ("Network error", message.clone()),
            other => (title, other.to_string()),
        };
        warn!("{title}: {message}");
        self.observer.notice(&Notice::err(title, message));
        err
    }

    fn reset(&mut self, purpose: OtpPurpose) {
        *self.slot_mut(purpose) = FlowState::Idle;
        self.publish(purpose);
    }

    fn publish(&mut self, purpose: OtpPurpose) {
        let view = self.view(purpose);
        self.observer.flow_changed(&view);
    }

    const fn slot(&self, purpose: OtpPurpose) -> &FlowState {
        match purpose {
            OtpPurpose::Signup => &self.signup,
            OtpPurpose::Signin => &self.signin,
        }
    }

    fn slot_mut(&mut self, purpose: OtpPurpose) -> &mut FlowState {
        match purpose {
            OtpPurpose::Signup => &mut self.signup,
            OtpPurpose::Signin => &mut self.signin,
        }
    }
}

async fn request_otp<A: AuthApi>(
    api: &A,
    purpose: OtpPurpose,
    credentials: &Credentials,
) -> Result<OtpRequestId, ApiError> {
    match purpose {
        OtpPurpose::Signup => api.request_signup_otp(credentials).await,
        OtpPurpose::Signin => api.request_signin_otp(credentials).await,
    }
}

fn sent_message(purpose: OtpPurpose, credentials: &Credentials) -> String {
    match (purpose, credentials.email.as_deref()) {
        (OtpPurpose::Signup, Some(email)) if !email.is_empty() => {
            format!("Check {email} for the code")
        }
        _ => "Check your email for the code".to_string(),
    }
}

const fn submit_failure_title(purpose: OtpPurpose) -> &'static str {
    match purpose {
        OtpPurpose::Signup => "Registration failed",
        OtpPurpose::Signin => "Sign in failed",
    }
}
