//! HTTP API: subscriber and enrollment lookups, admin login.
//!
//! Lookups go through the [`Directory`] trait so the pipeline can be driven
//! by a scripted directory in tests. [`ApiClient`] is the reqwest-backed
//! implementation.
//!
//! Status handling for lookups:
//!
//! | Response | Result |
//! |----------|--------|
//! | 2xx, JSON record | `Ok(record)` |
//! | 2xx, `null` body | [`LookupError::NotFound`] |
//! | 2xx, other body | [`LookupError::Decode`] |
//! | 401 / 403 | [`LookupError::Unauthorized`] |
//! | other 4xx | [`LookupError::NotFound`] |
//! | 5xx | [`LookupError::Server`] |
//! | no response | [`LookupError::Network`] |

mod types;

use std::time::Duration;

use async_trait::async_trait;
use dialer_core::Session;
use dialer_settings::ApiSettings;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

pub use types::{EnrollmentRecord, UserRecord};
use types::LoginResponse;

use crate::errors::{LoginError, LookupError};

const LOGIN_FAILED: &str = "login failed";

/// Authenticated record lookups.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Find the subscriber with the full phone number `phone`.
    async fn find_user(&self, token: &str, phone: &str) -> Result<UserRecord, LookupError>;

    /// Find the enrollment of subscriber `user_id`.
    async fn find_enrollment(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<EnrollmentRecord, LookupError>;
}

/// reqwest client for the dialer's HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from API settings.
    ///
    /// `timeout_ms` of `None` leaves reqwest's default (no overall timeout).
    pub fn new(settings: &ApiSettings) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(settings.user_agent.clone());
        if let Some(ms) = settings.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        Ok(Self::with_client(&settings.base_url, builder.build()?))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a [`Session`].
    ///
    /// Empty credentials fail before any request is made.
    #[tracing::instrument(skip_all, fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, LoginError> {
        if username.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let url = format!("{}/admin_login", self.base_url);
        let resp = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| LoginError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| LoginError::Network(e.to_string()))?;
        let parsed: Option<LoginResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let reason = parsed
                .and_then(|r| r.failure_reason())
                .unwrap_or_else(|| LOGIN_FAILED.to_string());
            warn!(status = status.as_u16(), %reason, "login rejected");
            return Err(LoginError::Rejected(reason));
        }

        let resp = parsed.unwrap_or_default();
        let Some(branch_id) = resp.branch_id.clone().filter(|b| !b.is_empty()) else {
            let reason = resp
                .failure_reason()
                .unwrap_or_else(|| LOGIN_FAILED.to_string());
            warn!(%reason, "login response without branch");
            return Err(LoginError::Rejected(reason));
        };
        let Some(access_token) = resp.access_token.filter(|t| !t.is_empty()) else {
            return Err(LoginError::Rejected(
                "login response missing access token".to_string(),
            ));
        };

        info!(%branch_id, "login succeeded");
        Ok(Session {
            access_token,
            refresh_token: resp.refresh_token.unwrap_or_default(),
            branch_id,
        })
    }

    async fn get_record<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: &str,
    ) -> Result<T, LookupError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;
        debug!(path, status, bytes = body.len(), "lookup response");

        if !(200..300).contains(&status) {
            return Err(LookupError::from_status(status, &body));
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))?;
        if value.is_null() {
            return Err(LookupError::NotFound { status });
        }
        serde_json::from_value(value).map_err(|e| LookupError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Directory for ApiClient {
    #[tracing::instrument(skip_all)]
    async fn find_user(&self, token: &str, phone: &str) -> Result<UserRecord, LookupError> {
        self.get_record("/users", &[("phone", phone)], token).await
    }

    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    async fn find_enrollment(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<EnrollmentRecord, LookupError> {
        self.get_record("/enrolls", &[("user_id", user_id)], token)
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
