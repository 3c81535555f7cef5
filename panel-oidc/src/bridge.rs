//! OIDC bridge service
//!
//! The state machine over the two transaction modes:
//!
//! | step      | login                          | connect                        |
//! |-----------|--------------------------------|--------------------------------|
//! | authorize | no session, no user in state   | valid token, user id in state  |
//! | callback  | state verify → exchange → userinfo (identical for both modes)  |
//! | resolve   | connection lookup → issue token| insert connection              |
//!
//! The callback leg performs two sequential outbound HTTP calls and
//! nothing else; persistence and token issuance happen in the resolve
//! step so a provider failure never leaves half a result behind.

use crate::http::ProviderClient;
use crate::provider::{OidcProvider, ProviderInfo, ProviderRegistry};
use crate::store::{ConnectionStore, IdentityConnection};
use panel_auth::{AuthError, AuthResult, AuthService, OidcMode, OidcState, StateCodec};
use panel_core::User;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Default timeout for provider HTTP calls.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// The verified outcome of an OIDC callback, before resolution.
///
/// `mode` and `user_id` come from the signed state; `subject` and `email`
/// come from the provider. The caller dispatches on `mode`: login-mode
/// results carry no `user_id` and therefore cannot feed `connect`.
#[derive(Debug, Clone)]
pub struct CallbackResult {
    /// Transaction mode carried through the round trip
    pub mode: OidcMode,

    /// Partner the round trip belongs to
    pub partner_id: Uuid,

    /// Authenticated user (connect mode only)
    pub user_id: Option<Uuid>,

    /// Configured provider id
    pub provider_id: String,

    /// The provider's stable identifier for the user
    pub subject: String,

    /// Email reported by the provider
    pub email: String,
}

/// Federated identity service.
///
/// Holds the immutable provider snapshot, the state codec, the
/// authentication service (for token issuance on OIDC login), and the
/// connection store. Stateless per request; safe to share across
/// requests.
#[derive(Clone)]
pub struct OidcService {
    registry: ProviderRegistry,
    codec: StateCodec,
    auth: AuthService,
    connections: Arc<dyn ConnectionStore>,
    http: ProviderClient,
}

impl std::fmt::Debug for OidcService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcService")
            .field("providers", &self.registry.len())
            .finish()
    }
}

impl OidcService {
    /// Create a new OIDC service with the default HTTP timeout.
    pub fn new(
        registry: ProviderRegistry,
        codec: StateCodec,
        auth: AuthService,
        connections: Arc<dyn ConnectionStore>,
    ) -> Self {
        Self {
            registry,
            codec,
            auth,
            connections,
            http: ProviderClient::new(DEFAULT_HTTP_TIMEOUT),
        }
    }

    /// Replace the provider HTTP client (custom timeout).
    pub fn with_http_client(mut self, http: ProviderClient) -> Self {
        self.http = http;
        self
    }

    /// The enabled providers, id and name only.
    pub fn providers(&self) -> Vec<ProviderInfo> {
        self.registry.infos()
    }

    /// Look up a configured provider by id.
    pub fn get_provider(&self, id: &str) -> Option<&OidcProvider> {
        self.registry.get(id)
    }

    /// Build the provider authorization URL with a signed state parameter.
    ///
    /// Connect mode requires the authenticated user's id; login mode must
    /// not carry one. The mismatch is a caller bug, surfaced as an
    /// internal error rather than a silently wrong state.
    pub fn authorize_url(
        &self,
        provider: &OidcProvider,
        partner_id: Uuid,
        mode: OidcMode,
        user_id: Option<Uuid>,
        callback_url: &str,
    ) -> AuthResult<String> {
        match (mode, user_id) {
            (OidcMode::Connect, None) => {
                return Err(AuthError::Internal(
                    "connect mode requires a user id".to_string(),
                ));
            }
            (OidcMode::Login, Some(_)) => {
                return Err(AuthError::Internal(
                    "login mode must not carry a user id".to_string(),
                ));
            }
            _ => {}
        }

        let state = OidcState::new(mode, partner_id, user_id, &provider.id);
        let signed_state = self.codec.encode(&state)?;

        let url = Url::parse_with_params(
            &provider.authorize_url,
            &[
                ("client_id", provider.client_id.as_str()),
                ("redirect_uri", callback_url),
                ("response_type", "code"),
                ("scope", provider.scope_param().as_str()),
                ("state", signed_state.as_str()),
            ],
        )
        .map_err(|e| {
            AuthError::Config(format!(
                "invalid authorize URL for provider {}: {}",
                provider.id, e
            ))
        })?;

        Ok(url.into())
    }

    /// Validate the returned state, exchange the code, and fetch userinfo.
    ///
    /// Everything the provider sent back is untrusted until the state's
    /// signature verifies. Provider HTTP failures are fatal for this
    /// attempt; the surrounding layer redirects the user to a generic
    /// error indicator and they try again.
    #[instrument(skip_all)]
    pub async fn handle_callback(
        &self,
        code: &str,
        raw_state: &str,
        callback_url: &str,
    ) -> AuthResult<CallbackResult> {
        let state = self.codec.decode(raw_state)?;

        let provider = self
            .registry
            .get(&state.provider)
            .ok_or_else(|| {
                warn!(provider = %state.provider, "Callback for unconfigured provider");
                AuthError::UnknownProvider(state.provider.clone())
            })?;

        let token = self.http.exchange_code(provider, code, callback_url).await?;
        let info = self.http.fetch_userinfo(provider, &token.access_token).await?;

        debug!(
            mode = state.mode.as_str(),
            provider = %state.provider,
            "OIDC callback verified"
        );

        Ok(CallbackResult {
            mode: state.mode,
            partner_id: state.partner_id,
            user_id: state.user_id,
            provider_id: state.provider,
            subject: info.sub,
            email: info.email,
        })
    }

    /// Resolve an OIDC login: look up the connection and issue a token.
    #[instrument(skip(self, subject), fields(partner_id = %partner_id, provider_id))]
    pub async fn login_by_oidc(
        &self,
        partner_id: Uuid,
        provider_id: &str,
        subject: &str,
    ) -> AuthResult<(String, User)> {
        let user_id = self
            .connections
            .find_by_provider_subject(partner_id, provider_id, subject)
            .await?
            .ok_or(AuthError::NoAccountLinked)?;

        let user = self
            .auth
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                // The connection outlived its user; data repair territory.
                warn!(%user_id, "Connection references a missing user");
                AuthError::Internal("connection references a missing user".to_string())
            })?;

        let token = self.auth.issue_token(&user)?;
        debug!(user_id = %user.id, "OIDC login succeeded");
        Ok((token, user))
    }

    /// Link a provider identity to a user.
    ///
    /// An existing connection for the (user, provider) pair, or the same
    /// external subject linked elsewhere, surfaces as
    /// [`AuthError::ConnectionConflict`]; nothing is overwritten.
    #[instrument(skip(self, subject, email), fields(user_id = %user_id, provider_id))]
    pub async fn connect(
        &self,
        user_id: Uuid,
        partner_id: Uuid,
        provider_id: &str,
        subject: &str,
        email: &str,
    ) -> AuthResult<()> {
        let connection =
            IdentityConnection::new(user_id, partner_id, provider_id, subject, email);
        self.connections.insert(connection).await?;

        debug!("Provider connected");
        Ok(())
    }

    /// All of a user's connections, oldest first.
    pub async fn list_connections(&self, user_id: Uuid) -> AuthResult<Vec<IdentityConnection>> {
        Ok(self.connections.list_by_user(user_id).await?)
    }

    /// Remove a user's connection for a provider.
    ///
    /// Not idempotent-silent: removing a connection that does not exist
    /// fails with [`AuthError::ConnectionNotFound`].
    #[instrument(skip(self), fields(user_id = %user_id, provider_id))]
    pub async fn disconnect(&self, user_id: Uuid, provider_id: &str) -> AuthResult<()> {
        let removed = self.connections.delete(user_id, provider_id).await?;
        if removed == 0 {
            return Err(AuthError::ConnectionNotFound);
        }

        debug!("Provider disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryConnectionStore;
    use panel_auth::TokenService;
    use panel_core::MemoryUserStore;

    const TEST_SECRET: &str = "test-secret-key-for-bridge-tests-32ch";

    fn test_provider() -> OidcProvider {
        OidcProvider {
            id: "google".to_string(),
            name: "Google".to_string(),
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            scopes: vec!["openid".to_string(), "email".to_string()],
        }
    }

    fn test_service() -> OidcService {
        let auth = AuthService::new(
            Arc::new(MemoryUserStore::new()),
            TokenService::with_secret(TEST_SECRET),
        );
        OidcService::new(
            ProviderRegistry::new(vec![test_provider()]),
            StateCodec::new(TEST_SECRET),
            auth,
            Arc::new(MemoryConnectionStore::new()),
        )
    }

    #[test]
    fn test_providers_carry_no_secrets() {
        let infos = test_service().providers();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, "google");
    }

    #[test]
    fn test_authorize_url_login_mode() {
        let service = test_service();
        let provider = test_provider();
        let partner_id = Uuid::now_v7();

        let url = service
            .authorize_url(
                &provider,
                partner_id,
                OidcMode::Login,
                None,
                "https://panel.test/auth/oidc/callback",
            )
            .unwrap();

        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.host_str(), Some("accounts.google.com"));

        let params: std::collections::HashMap<_, _> = parsed.query_pairs().collect();
        assert_eq!(params["client_id"], "test-client-id");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "openid email");
        assert_eq!(
            params["redirect_uri"],
            "https://panel.test/auth/oidc/callback"
        );

        // The state parameter must decode back to what we encoded.
        let state = StateCodec::new(TEST_SECRET).decode(&params["state"]).unwrap();
        assert_eq!(state.mode, OidcMode::Login);
        assert_eq!(state.partner_id, partner_id);
        assert!(state.user_id.is_none());
        assert_eq!(state.provider, "google");
    }

    #[test]
    fn test_authorize_url_connect_mode_carries_user() {
        let service = test_service();
        let user_id = Uuid::now_v7();

        let url = service
            .authorize_url(
                &test_provider(),
                Uuid::now_v7(),
                OidcMode::Connect,
                Some(user_id),
                "https://panel.test/auth/oidc/callback",
            )
            .unwrap();

        let parsed = Url::parse(&url).unwrap();
        let params: std::collections::HashMap<_, _> = parsed.query_pairs().collect();
        let state = StateCodec::new(TEST_SECRET).decode(&params["state"]).unwrap();

        assert_eq!(state.mode, OidcMode::Connect);
        assert_eq!(state.user_id, Some(user_id));
    }

    #[test]
    fn test_authorize_url_rejects_mode_user_mismatch() {
        let service = test_service();
        let provider = test_provider();

        let connect_without_user = service.authorize_url(
            &provider,
            Uuid::now_v7(),
            OidcMode::Connect,
            None,
            "https://panel.test/cb",
        );
        assert!(matches!(connect_without_user, Err(AuthError::Internal(_))));

        let login_with_user = service.authorize_url(
            &provider,
            Uuid::now_v7(),
            OidcMode::Login,
            Some(Uuid::now_v7()),
            "https://panel.test/cb",
        );
        assert!(matches!(login_with_user, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn test_login_by_oidc_without_link_fails() {
        let service = test_service();

        let result = service
            .login_by_oidc(Uuid::now_v7(), "google", "sub-1")
            .await;
        assert!(matches!(result, Err(AuthError::NoAccountLinked)));
    }

    #[tokio::test]
    async fn test_disconnect_missing_connection_fails() {
        let service = test_service();

        let result = service.disconnect(Uuid::now_v7(), "google").await;
        assert!(matches!(result, Err(AuthError::ConnectionNotFound)));
    }

    #[tokio::test]
    async fn test_connect_then_list_then_disconnect() {
        let service = test_service();
        let user_id = Uuid::now_v7();
        let partner_id = Uuid::now_v7();

        service
            .connect(user_id, partner_id, "google", "sub-1", "a@x.com")
            .await
            .unwrap();

        let listed = service.list_connections(user_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].provider_id, "google");
        assert_eq!(listed[0].subject, "sub-1");

        service.disconnect(user_id, "google").await.unwrap();
        assert!(service.list_connections(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_connect_for_provider_conflicts() {
        let service = test_service();
        let user_id = Uuid::now_v7();
        let partner_id = Uuid::now_v7();

        service
            .connect(user_id, partner_id, "google", "sub-1", "a@x.com")
            .await
            .unwrap();

        let result = service
            .connect(user_id, partner_id, "google", "sub-2", "a@x.com")
            .await;
        assert!(matches!(result, Err(AuthError::ConnectionConflict)));
    }
}
