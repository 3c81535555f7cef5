//! Provider HTTP client
//!
//! The two outbound calls of the callback leg: exchanging the
//! authorization code for an access token (form-encoded POST) and fetching
//! the subject/email pair from the userinfo endpoint (Bearer GET).
//!
//! Provider failures are logged with their status for operators but
//! normalized to [`AuthError::TokenExchangeFailed`] /
//! [`AuthError::UserinfoFailed`] before they leave this module; no
//! provider status code or error body reaches the caller. There is no
//! retry here. A failed callback attempt is fatal and the user tries
//! again.

use crate::provider::OidcProvider;
use panel_auth::{AuthError, AuthResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Response from a provider token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token for the userinfo call
    #[serde(default)]
    pub access_token: String,

    /// Token type (usually "Bearer")
    #[serde(default)]
    pub token_type: String,
}

/// Subject and email from a provider userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// The provider's stable identifier for the user
    #[serde(default)]
    pub sub: String,

    /// Email, if the granted scopes include it
    #[serde(default)]
    pub email: String,
}

/// HTTP client for provider token-exchange and userinfo calls.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
}

impl ProviderClient {
    /// Create a new provider client with a request timeout.
    ///
    /// The timeout is the only cancellation mechanism for the callback
    /// leg; the bridge itself imposes none.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Exchange an authorization code for an access token.
    #[instrument(skip(self, code), fields(provider = %provider.id))]
    pub async fn exchange_code(
        &self,
        provider: &OidcProvider,
        code: &str,
        callback_url: &str,
    ) -> AuthResult<TokenResponse> {
        debug!("Exchanging authorization code");

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", callback_url),
            ("client_id", provider.client_id.as_str()),
            ("client_secret", provider.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(&provider.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!("Token endpoint unreachable: {}", e);
                AuthError::TokenExchangeFailed
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Token endpoint returned error");
            return Err(AuthError::TokenExchangeFailed);
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            warn!("Token response did not decode: {}", e);
            AuthError::TokenExchangeFailed
        })?;

        if token.access_token.is_empty() {
            warn!("Token response carried no access token");
            return Err(AuthError::TokenExchangeFailed);
        }

        Ok(token)
    }

    /// Fetch the subject and email for an access token.
    #[instrument(skip(self, access_token), fields(provider = %provider.id))]
    pub async fn fetch_userinfo(
        &self,
        provider: &OidcProvider,
        access_token: &str,
    ) -> AuthResult<UserInfo> {
        debug!("Fetching userinfo");

        let response = self
            .client
            .get(&provider.userinfo_url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| {
                warn!("Userinfo endpoint unreachable: {}", e);
                AuthError::UserinfoFailed
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Userinfo endpoint returned error");
            return Err(AuthError::UserinfoFailed);
        }

        let info: UserInfo = response.json().await.map_err(|e| {
            warn!("Userinfo response did not decode: {}", e);
            AuthError::UserinfoFailed
        })?;

        // A userinfo document without a subject is useless for linking.
        if info.sub.is_empty() {
            warn!("Userinfo response missing sub claim");
            return Err(AuthError::UserinfoFailed);
        }

        Ok(info)
    }
}

impl Default for ProviderClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
