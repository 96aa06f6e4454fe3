//! Identity provider client.
//!
//! The admin panel does not store passwords. Credential checks and account
//! lifecycle (create/update/delete) go through an external identity provider
//! over its admin REST API; the local `users` table mirrors the directory
//! and shares the provider's account IDs.
//!
//! Authentication uses a service key via `Authorization: Bearer <key>`.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use lumeo_core::{UserId, UserRole};

use crate::config::IdentityConfig;

/// Errors that can occur when talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("identity API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Credentials were rejected, or the service key is invalid.
    #[error("identity provider rejected the request")]
    Unauthorized,

    /// No account exists for the given ID.
    #[error("identity account not found")]
    AccountNotFound,

    /// Failed to parse a provider response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// An account as known to the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityAccount {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct CreateAccountRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
    role: &'a str,
}

#[derive(Serialize)]
struct UpdateAccountRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

/// Identity provider API client.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    /// Create a new identity provider client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the service key
    /// contains characters not valid in a header.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.service_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| IdentityError::Parse(format!("invalid service key: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(IdentityClientInner {
                client,
                base_url: config.url.trim_end_matches('/').to_owned(),
            }),
        })
    }

    /// Check a credential pair, returning the account on success.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Unauthorized` when the credentials are wrong,
    /// other variants for transport or provider failures.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentityAccount, IdentityError> {
        let url = format!("{}/v1/verify", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(&url)
            .json(&VerifyRequest {
                email,
                password: password.expose_secret(),
            })
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Create a provider account, returning its ID. The local user record
    /// reuses this ID.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` variants for conflicts, rejections, or
    /// transport failures.
    pub async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
        name: &str,
        role: UserRole,
    ) -> Result<UserId, IdentityError> {
        let url = format!("{}/v1/accounts", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(&url)
            .json(&CreateAccountRequest {
                email,
                password: password.expose_secret(),
                name,
                role: role.as_str(),
            })
            .send()
            .await?;
        let account: IdentityAccount = Self::handle_response(response).await?;
        Ok(UserId::new(account.id))
    }

    /// Push profile changes to the provider account.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::AccountNotFound` when the account doesn't
    /// exist, other variants for transport or provider failures.
    pub async fn update_account(
        &self,
        id: UserId,
        email: Option<&str>,
        name: Option<&str>,
        role: Option<UserRole>,
    ) -> Result<(), IdentityError> {
        let url = format!("{}/v1/accounts/{}", self.inner.base_url, id);
        let response = self
            .inner
            .client
            .patch(&url)
            .json(&UpdateAccountRequest {
                email,
                name,
                role: role.map(|r| r.as_str()),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    /// Delete a provider account. Succeeds if the account is already gone,
    /// so directory deletes stay idempotent.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` variants for rejections or transport
    /// failures.
    pub async fn delete_account(&self, id: UserId) -> Result<(), IdentityError> {
        let url = format!("{}/v1/accounts/{}", self.inner.base_url, id);
        let response = self.inner.client.delete(&url).send().await?;

        let status = response.status();
        if status.is_success() || status.as_u16() == 404 {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, IdentityError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| IdentityError::Parse(format!("failed to parse response: {e}")));
        }
        Err(Self::parse_error(response).await)
    }

    async fn parse_error(response: reqwest::Response) -> IdentityError {
        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return IdentityError::Unauthorized;
        }
        if status == 404 {
            return IdentityError::AccountNotFound;
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_owned());
        IdentityError::Api { status, message }
    }
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use lumeo_core::UserRole;

    use super::*;
    use crate::config::IdentityConfig;

    fn test_config(url: &str) -> IdentityConfig {
        IdentityConfig {
            url: url.to_owned(),
            service_key: SecretString::from("test-service-key"),
        }
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let client = IdentityClient::new(&test_config("https://id.example.com/")).unwrap();
        assert_eq!(client.inner.base_url, "https://id.example.com");
    }

    #[test]
    fn update_request_skips_unset_fields() {
        let body = UpdateAccountRequest {
            email: None,
            name: Some("New Name"),
            role: Some(UserRole::Editor.as_str()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("email").is_none());
        assert_eq!(json["name"], "New Name");
        assert_eq!(json["role"], "EDITOR");
    }

    #[test]
    fn debug_hides_service_key() {
        let client = IdentityClient::new(&test_config("https://id.example.com")).unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("test-service-key"));
    }
}
