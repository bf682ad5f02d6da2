//! Authenticated calls to the file vault API.
//!
//! Every request goes through [`require_auth`] first and carries the stored
//! bearer token. What a `401`/`403` means is decided per call by [`OnReject`].

pub mod audit;
pub mod files;

use crate::{
    api::{handle_authorized_json_response, http_client, map_request_error},
    auth::{
        error::{ApiError, AuthError},
        observer::{AuthObserver, NoopObserver, Notice},
        types::Session,
    },
    config::AppConfig,
    session::{require_auth, SessionStore, Surface},
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info_span, warn, Instrument};

pub use audit::{AuditLogEntry, AUDIT_LOGS_PATH};
pub use files::{FileMetadata, FILES_LIST_PATH};

/// Reaction to a `401`/`403` answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnReject {
    /// The token is no good: erase the session and send the user to sign in.
    SignOut,
    /// Role-gated resource: report access denied and keep the session.
    Deny,
}

/// HTTP client bound to the stored session.
#[derive(Debug)]
pub struct AuthorizedClient<S, O = NoopObserver> {
    client: Client,
    config: AppConfig,
    store: S,
    observer: O,
}

impl<S: SessionStore, O: AuthObserver> AuthorizedClient<S, O> {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AppConfig, store: S, observer: O) -> Result<Self, AuthError> {
        let client = http_client(config.timeout).map_err(AuthError::from_transport)?;
        Ok(Self {
            client,
            config,
            store,
            observer,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// `GET` a JSON resource as the signed-in user.
    ///
    /// # Errors
    /// `SessionInvalid` when there is no usable session, or when the server
    /// rejected the token under [`OnReject::SignOut`] (the session is erased).
    /// `AccessDenied` for a rejection under [`OnReject::Deny`]. Other failures
    /// map as for the auth endpoints.
    pub async fn get_json<T: DeserializeOwned>(
        &mut self,
        path: &str,
        on_reject: OnReject,
    ) -> Result<T, AuthError> {
        let session = self.session()?;
        self.fetch(&session, path, on_reject).await
    }

    /// The stored session, or `SessionInvalid` after signalling the redirect.
    fn session(&mut self) -> Result<Session, AuthError> {
        require_auth(&self.store).map_err(|surface| {
            debug!("no session, redirect to {surface:?}");
            self.observer.redirect(surface);
            AuthError::SessionInvalid
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &mut self,
        session: &Session,
        path: &str,
        on_reject: OnReject,
    ) -> Result<T, AuthError> {
        let url = self.config.endpoint(path);
        let span = info_span!("vault.request", http.method = "GET", url = %url);
        let result = async {
            let response = self
                .client
                .get(&url)
                .bearer_auth(&session.token)
                .send()
                .await
                .map_err(|err| map_request_error(&err))?;
            handle_authorized_json_response(response).await
        }
        .instrument(span)
        .await;

        match result {
            Ok(value) => Ok(value),
            Err(ApiError::Unauthorized { status }) => match on_reject {
                OnReject::SignOut => {
                    self.sign_out(status);
                    Err(AuthError::SessionInvalid)
                }
                OnReject::Deny => {
                    warn!("{path} denied with {status}");
                    self.deny();
                    Err(AuthError::AccessDenied)
                }
            },
            Err(err) => Err(AuthError::from_transport(err)),
        }
    }

    fn sign_out(&mut self, status: u16) {
        warn!("session rejected with {status}, clearing it");
        if let Err(err) = self.store.erase() {
            warn!("failed to erase rejected session: {err}");
        }
        self.observer
            .notice(&Notice::warn("Session expired", "Please sign in again"));
        self.observer.redirect(Surface::SignIn);
    }

    fn deny(&mut self) {
        self.observer
            .notice(&Notice::err("Access denied", "Admin/Auditor role required"));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::observer::{NoticeLevel, RecordingObserver};
    use crate::auth::types::Role;
    use crate::session::{MemorySessionStore, StoreError};
    use anyhow::Result;
    use serde_json::{json, Value};
    use std::{io, net::TcpListener, path::PathBuf};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn config(server: &MockServer) -> AppConfig {
        AppConfig::new(
            Some(&format!("{}/api", server.uri())),
            Some(PathBuf::from("/tmp/vaultgate-test-session.json")),
            Some(5),
        )
        .unwrap()
    }

    fn session(role: Role) -> Session {
        Session {
            token: "tok".to_string(),
            username: "a".to_string(),
            role,
        }
    }

    fn signed_in(role: Role) -> MemorySessionStore {
        let store = MemorySessionStore::new();
        store.save(&session(role)).unwrap();
        store
    }

    async fn respond_on_ping(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    /// Holds a valid record but cannot erase it.
    struct StickyStore(MemorySessionStore);

    impl SessionStore for StickyStore {
        fn read_raw(&self) -> Result<Option<String>, StoreError> {
            self.0.read_raw()
        }

        fn write_raw(&self, value: &str) -> Result<(), StoreError> {
            self.0.write_raw(value)
        }

        fn erase(&self) -> Result<(), StoreError> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    #[tokio::test]
    async fn attaches_bearer_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let mut client =
            AuthorizedClient::new(config(&server), signed_in(Role::User), NoopObserver)?;
        let value: Value = client.get_json("/ping", OnReject::SignOut).await?;
        assert_eq!(value, json!({"ok": true}));
        Ok(())
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_notifies() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        respond_on_ping(&server, ResponseTemplate::new(401)).await;

        let mut client = AuthorizedClient::new(
            config(&server),
            signed_in(Role::Admin),
            RecordingObserver::default(),
        )?;
        let result = client.get_json::<Value>("/ping", OnReject::SignOut).await;

        assert!(matches!(result, Err(AuthError::SessionInvalid)));
        assert_eq!(client.store().read_raw()?, None);
        let notice = client.observer().last_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warn);
        assert_eq!(notice.title, "Session expired");
        assert_eq!(client.observer().redirects, vec![Surface::SignIn]);
        Ok(())
    }

    #[tokio::test]
    async fn forbidden_signs_out_when_asked_to() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        respond_on_ping(&server, ResponseTemplate::new(403)).await;

        let mut client =
            AuthorizedClient::new(config(&server), signed_in(Role::User), NoopObserver)?;
        let result = client.get_json::<Value>("/ping", OnReject::SignOut).await;
        assert!(matches!(result, Err(AuthError::SessionInvalid)));
        assert!(client.store().read_raw()?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn denied_resource_keeps_session() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        respond_on_ping(&server, ResponseTemplate::new(403)).await;

        let mut client = AuthorizedClient::new(
            config(&server),
            signed_in(Role::User),
            RecordingObserver::default(),
        )?;
        let result = client.get_json::<Value>("/ping", OnReject::Deny).await;

        assert!(matches!(result, Err(AuthError::AccessDenied)));
        assert!(client.store().read_raw()?.is_some());
        assert_eq!(client.observer().last_notice().unwrap().title, "Access denied");
        assert!(client.observer().redirects.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn erase_failure_still_reports_invalid_session() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        respond_on_ping(&server, ResponseTemplate::new(401)).await;

        let mut client = AuthorizedClient::new(
            config(&server),
            StickyStore(signed_in(Role::User)),
            RecordingObserver::default(),
        )?;
        let result = client.get_json::<Value>("/ping", OnReject::SignOut).await;

        assert!(matches!(result, Err(AuthError::SessionInvalid)));
        assert_eq!(client.observer().redirects, vec![Surface::SignIn]);
        Ok(())
    }

    #[tokio::test]
    async fn server_error_keeps_session() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        respond_on_ping(
            &server,
            ResponseTemplate::new(500).set_body_json(json!({"message": "Storage offline"})),
        )
        .await;

        let mut client =
            AuthorizedClient::new(config(&server), signed_in(Role::User), NoopObserver)?;
        let result = client.get_json::<Value>("/ping", OnReject::SignOut).await;
        assert!(
            matches!(result, Err(AuthError::Validation(message)) if message == "Storage offline")
        );
        assert!(client.store().read_raw()?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn missing_session_never_hits_the_network() -> Result<()> {
        // Nothing listens here; a request would surface as a network error.
        let config = AppConfig::new(
            Some("http://127.0.0.1:9/api"),
            Some(PathBuf::from("/tmp/vaultgate-test-session.json")),
            Some(1),
        )?;
        let mut client =
            AuthorizedClient::new(config, MemorySessionStore::new(), RecordingObserver::default())?;
        let result = client.get_json::<Value>("/ping", OnReject::SignOut).await;
        assert!(matches!(result, Err(AuthError::SessionInvalid)));
        assert_eq!(client.observer().redirects, vec![Surface::SignIn]);
        Ok(())
    }
}
