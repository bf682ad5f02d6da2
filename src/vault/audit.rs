use crate::{
    auth::{error::AuthError, observer::AuthObserver},
    session::SessionStore,
    vault::{AuthorizedClient, OnReject},
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// Audit trail, readable by admins and auditors.
pub const AUDIT_LOGS_PATH: &str = "/audit/logs";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub action: String,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_id: Option<u64>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl<S: SessionStore, O: AuthObserver> AuthorizedClient<S, O> {
    /// Audit log entries. Roles without elevation are turned away locally; a
    /// server-side `401`/`403` is reported as denied and keeps the session.
    ///
    /// # Errors
    /// `AccessDenied` for non-elevated roles or a server rejection, otherwise
    /// see [`AuthorizedClient::get_json`].
    #[instrument(skip(self))]
    pub async fn list_audit_logs(&mut self) -> Result<Vec<AuditLogEntry>, AuthError> {
        let session = self.session()?;
        if !session.role.is_elevated() {
            warn!("audit logs refused for {}", session.role);
            self.deny();
            return Err(AuthError::AccessDenied);
        }
        self.fetch(&session, AUDIT_LOGS_PATH, OnReject::Deny).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::{
        observer::RecordingObserver,
        types::{Role, Session},
    };
    use crate::config::AppConfig;
    use crate::session::{MemorySessionStore, Surface};
    use anyhow::Result;
    use serde_json::json;
    use std::{net::TcpListener, path::PathBuf};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(
        server: &MockServer,
        role: Role,
    ) -> AuthorizedClient<MemorySessionStore, RecordingObserver> {
        let store = MemorySessionStore::new();
        store
            .save(&Session {
                token: "tok".to_string(),
                username: "a".to_string(),
                role,
            })
            .unwrap();
        let config = AppConfig::new(
            Some(&format!("{}/api", server.uri())),
            Some(PathBuf::from("/tmp/vaultgate-test-session.json")),
            Some(5),
        )
        .unwrap();
        AuthorizedClient::new(config, store, RecordingObserver::default()).unwrap()
    }

    #[test]
    fn decodes_sparse_entries() {
        let entry: AuditLogEntry = serde_json::from_value(json!({
            "id": 4,
            "action": "LOGIN",
            "status": "SUCCESS",
            "timestamp": "2024-05-01T10:00:00"
        }))
        .unwrap();
        assert_eq!(entry.action, "LOGIN");
        assert_eq!(entry.username, None);
        assert_eq!(entry.timestamp.as_deref(), Some("2024-05-01T10:00:00"));
    }

    #[tokio::test]
    async fn auditor_reads_logs() -> Result<()> {
        if TcpListener::bind("127.0.0.1:0").is_err() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/audit/logs"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 1,
                    "userId": 2,
                    "username": "bob",
                    "role": "ROLE_USER",
                    "action": "FILE_DOWNLOAD",
                    "resourceType": "FILE",
                    "resourceId": 7,
                    "fileName": "a.txt",
                    "status": "SUCCESS",
                    "timestamp": "2024-05-01T10:00:00",
                    "details": null
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let logs = client(&server, Role::Auditor).list_audit_logs().await?;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].username.as_deref(), Some("bob"));
        assert_eq!(logs[0].file_name.as_deref(), Some("a.txt"));
        Ok(())
    }

    #[tokio::test]
    async fn plain_user_is_denied_without_a_request() -> Result<()> {
        if TcpListener::bind("127.0.0.1:0").is_err() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/audit/logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let mut client = client(&server, Role::User);
        let result = client.list_audit_logs().await;

        assert!(matches!(result, Err(AuthError::AccessDenied)));
        assert_eq!(client.observer().last_notice().unwrap().title, "Access denied");
        Ok(())
    }

    #[tokio::test]
    async fn server_denial_keeps_the_session() -> Result<()> {
        if TcpListener::bind("127.0.0.1:0").is_err() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/audit/logs"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let mut client = client(&server, Role::Admin);
        let result = client.list_audit_logs().await;

        assert!(matches!(result, Err(AuthError::AccessDenied)));
        assert!(client.store().read_raw()?.is_some());
        assert!(!client
            .observer()
            .redirects
            .contains(&Surface::SignIn));
        Ok(())
    }
}
