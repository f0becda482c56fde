//! Network transport behind the widget.
//!
//! The trait mirrors the three gateway endpoints; tests substitute a
//! scripted implementation so the state machine can be exercised
//! without a server.

use chrono::{DateTime, Utc};
use embedauth_core::models::user::PublicUser;
use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

/// Form contents submitted by the widget.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Successful register/login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub trait AuthTransport: Send + Sync {
    fn register(
        &self,
        api_key: &str,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, WidgetError>> + Send;

    fn login(
        &self,
        api_key: &str,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, WidgetError>> + Send;

    fn me(
        &self,
        api_key: &str,
        token: &str,
    ) -> impl Future<Output = Result<PublicUser, WidgetError>> + Send;
}

impl<T: AuthTransport> AuthTransport for std::sync::Arc<T> {
    async fn register(
        &self,
        api_key: &str,
        credentials: &Credentials,
    ) -> Result<AuthResponse, WidgetError> {
        (**self).register(api_key, credentials).await
    }

    async fn login(
        &self,
        api_key: &str,
        credentials: &Credentials,
    ) -> Result<AuthResponse, WidgetError> {
        (**self).login(api_key, credentials).await
    }

    async fn me(&self, api_key: &str, token: &str) -> Result<PublicUser, WidgetError> {
        (**self).me(api_key, token).await
    }
}

/// reqwest-backed transport talking to a real server.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `GET /api/auth/me` wraps its payload in a `user` envelope.
#[derive(Debug, Deserialize)]
struct MeResponse {
    user: PublicUser,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Decode a response, turning non-2xx statuses into
    /// [`WidgetError::Api`] with the server's message.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, WidgetError> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|_| WidgetError::Network);
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.error)
            .unwrap_or_else(|_| "Request failed".to_string());
        Err(WidgetError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl AuthTransport for HttpTransport {
    async fn register(
        &self,
        api_key: &str,
        credentials: &Credentials,
    ) -> Result<AuthResponse, WidgetError> {
        let response = self
            .http
            .post(format!("{}/api/auth/register", self.base_url))
            .header("X-API-Key", api_key)
            .json(credentials)
            .send()
            .await
            .map_err(|_| WidgetError::Network)?;
        Self::decode(response).await
    }

    async fn login(
        &self,
        api_key: &str,
        credentials: &Credentials,
    ) -> Result<AuthResponse, WidgetError> {
        let response = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .header("X-API-Key", api_key)
            .json(credentials)
            .send()
            .await
            .map_err(|_| WidgetError::Network)?;
        Self::decode(response).await
    }

    async fn me(&self, api_key: &str, token: &str) -> Result<PublicUser, WidgetError> {
        let response = self
            .http
            .get(format!("{}/api/auth/me", self.base_url))
            .header("X-API-Key", api_key)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .map_err(|_| WidgetError::Network)?;
        let body: MeResponse = Self::decode(response).await?;
        Ok(body.user)
    }
}
