use crate::{
    api::{handle_empty_response, handle_json_response, http_client, map_request_error},
    auth::{
        error::ApiError,
        types::{
            Credentials, JwtResponse, OtpRequestId, OtpRequestResponse, OtpVerifyRequest,
            Session, SigninOtpRequest, SignupOtpRequest,
        },
    },
    config::AppConfig,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info_span, instrument, Instrument};

pub const SIGNUP_REQUEST_OTP_PATH: &str = "/auth/signup/request-otp";
pub const SIGNUP_VERIFY_PATH: &str = "/auth/signup/verify";
pub const SIGNIN_REQUEST_OTP_PATH: &str = "/auth/signin/request-otp";
pub const SIGNIN_VERIFY_PATH: &str = "/auth/signin/verify";

/// The four OTP operations of the auth API.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn request_signup_otp(&self, credentials: &Credentials)
        -> Result<OtpRequestId, ApiError>;

    async fn verify_signup_otp(&self, request_id: &OtpRequestId, otp: &str)
        -> Result<(), ApiError>;

    async fn request_signin_otp(&self, credentials: &Credentials)
        -> Result<OtpRequestId, ApiError>;

    async fn verify_signin_otp(&self, request_id: &OtpRequestId, otp: &str)
        -> Result<Session, ApiError>;
}

/// `AuthApi` over HTTP/JSON.
#[derive(Clone, Debug)]
pub struct HttpAuthApi {
    client: Client,
    config: AppConfig,
}

impl HttpAuthApi {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: http_client(config.timeout)?,
            config,
        })
    }

    async fn send<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.config.endpoint(path);
        let span = info_span!("auth.request", http.method = "POST", url = %url);
        self.client
            .post(&url)
            .json(body)
            .send()
            .instrument(span)
            .await
            .map_err(|err| map_request_error(&err))
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(path, body).await?;
        handle_json_response(response).await
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn request_signup_otp(
        &self,
        credentials: &Credentials,
    ) -> Result<OtpRequestId, ApiError> {
        let body = SignupOtpRequest::from_credentials(credentials);
        let response: OtpRequestResponse = self.post_json(SIGNUP_REQUEST_OTP_PATH, &body).await?;
        debug!(
            "signup OTP issued: {}",
            response.message.as_deref().unwrap_or("")
        );
        Ok(response.otp_request_id)
    }

    #[instrument(skip(self, otp))]
    async fn verify_signup_otp(
        &self,
        request_id: &OtpRequestId,
        otp: &str,
    ) -> Result<(), ApiError> {
        let body = OtpVerifyRequest {
            otp_request_id: request_id,
            otp,
        };
        let response = self.send(SIGNUP_VERIFY_PATH, &body).await?;
        handle_empty_response(response).await
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn request_signin_otp(
        &self,
        credentials: &Credentials,
    ) -> Result<OtpRequestId, ApiError> {
        let body = SigninOtpRequest::from_credentials(credentials);
        let response: OtpRequestResponse = self.post_json(SIGNIN_REQUEST_OTP_PATH, &body).await?;
        debug!(
            "signin OTP issued: {}",
            response.message.as_deref().unwrap_or("")
        );
        Ok(response.otp_request_id)
    }

    #[instrument(skip(self, otp))]
    async fn verify_signin_otp(
        &self,
        request_id: &OtpRequestId,
        otp: &str,
    ) -> Result<Session, ApiError> {
        let body = OtpVerifyRequest {
            otp_request_id: request_id,
            otp,
        };
        let response: JwtResponse = self.post_json(SIGNIN_VERIFY_PATH, &body).await?;
        Ok(response.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::types::Role;
    use anyhow::Result;
    use secrecy::SecretString;
    use serde_json::json;
    use std::{net::TcpListener, path::PathBuf};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn api(server: &MockServer) -> HttpAuthApi {
        let config = AppConfig::new(
            Some(&format!("{}/api", server.uri())),
            Some(PathBuf::from("/tmp/vaultgate-test-session.json")),
            Some(5),
        )
        .unwrap();
        HttpAuthApi::new(config).unwrap()
    }

    fn password() -> SecretString {
        SecretString::from("p".to_string())
    }

    #[tokio::test]
    async fn request_signin_otp_posts_credentials() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/signin/request-otp"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"username": "a", "password": "p"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "OTP sent to email",
                "otpRequestId": 17
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = api(&server)
            .request_signin_otp(&Credentials::signin("a", password()))
            .await?;
        assert_eq!(id, OtpRequestId::Number(17));
        Ok(())
    }

    #[tokio::test]
    async fn request_signup_otp_surfaces_server_message() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/signup/request-otp"))
            .and(body_json(json!({
                "username": "a",
                "email": "a@example.com",
                "password": "p",
                "role": "user"
            })))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"message": "Username is already taken"})),
            )
            .mount(&server)
            .await;

        let credentials = Credentials::signup("a", "a@example.com", password(), None);
        let result = api(&server).request_signup_otp(&credentials).await;
        assert_eq!(
            result,
            Err(ApiError::Rejected {
                status: 400,
                message: "Username is already taken".to_string()
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn verify_signin_otp_echoes_request_id() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/signin/verify"))
            .and(body_json(json!({"otpRequestId": "r1", "otp": "123456"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "t",
                "id": 1,
                "username": "a",
                "role": "ROLE_ADMIN"
            })))
            .mount(&server)
            .await;

        let session = api(&server)
            .verify_signin_otp(&OtpRequestId::from("r1"), "123456")
            .await?;
        assert_eq!(session.token, "t");
        assert_eq!(session.username, "a");
        assert_eq!(session.role, Role::Admin);
        Ok(())
    }

    #[tokio::test]
    async fn verify_signup_otp_accepts_message_body() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/signup/verify"))
            .and(body_json(json!({"otpRequestId": 5, "otp": "654321"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "User registered successfully!"})),
            )
            .mount(&server)
            .await;

        api(&server)
            .verify_signup_otp(&OtpRequestId::Number(5), "654321")
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn verify_rejection_without_message_reports_unknown_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/signin/verify"))
            .respond_with(ResponseTemplate::new(500).set_body_string(""))
            .mount(&server)
            .await;

        let result = api(&server)
            .verify_signin_otp(&OtpRequestId::Number(1), "000000")
            .await;
        assert_eq!(
            result,
            Err(ApiError::Rejected {
                status: 500,
                message: "Unknown error".to_string()
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_parse_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/signin/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
            .mount(&server)
            .await;

        let result = api(&server)
            .verify_signin_otp(&OtpRequestId::Number(1), "000000")
            .await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() -> Result<()> {
        // Bind then drop to get a port nobody listens on.
        let port = match TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener.local_addr()?.port(),
            Err(_) => {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            }
        };
        let config = AppConfig::new(
            Some(&format!("http://127.0.0.1:{port}/api")),
            Some(PathBuf::from("/tmp/vaultgate-test-session.json")),
            Some(2),
        )?;
        let api = HttpAuthApi::new(config)?;

        let result = api
            .request_signin_otp(&Credentials::signin("a", password()))
            .await;
        assert!(matches!(result, Err(ApiError::Network(_))));
        Ok(())
    }
}
