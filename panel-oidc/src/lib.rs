//! # Hostpanel Federated Identity
//!
//! This crate bridges external OIDC identity providers into first-party
//! panel sessions, scoped to the partner boundary like everything else in
//! the panel.
//!
//! ## Overview
//!
//! The panel-oidc crate handles:
//! - **Providers**: Static provider configuration behind an indexed registry
//! - **Authorize**: Building provider authorization URLs with signed state
//! - **Callback**: Code exchange and userinfo retrieval over HTTP
//! - **Resolution**: Dispatching a callback into a login or an
//!   account-linking outcome
//! - **Connections**: The provider↔user link store contract
//!
//! ## The two transaction modes
//!
//! ```text
//! login:    no session → authorize → callback → connection lookup → token
//! connect:  valid token → authorize → callback → connection insert
//! ```
//!
//! Which mode a callback belongs to travels inside the signed state: the
//! provider round trip is untrusted, so the mode, partner, and (for
//! connect) user id are all carried under the deployment's HMAC rather
//! than in cookies or query parameters.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use panel_oidc::{OidcProvider, OidcService, ProviderRegistry, MemoryConnectionStore};
//! use panel_auth::{AuthService, OidcMode, StateCodec, TokenService};
//! use panel_core::MemoryUserStore;
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! let registry = ProviderRegistry::new(vec![OidcProvider {
//!     id: "google".into(),
//!     name: "Google".into(),
//!     client_id: "client-id".into(),
//!     client_secret: "client-secret".into(),
//!     authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
//!     token_url: "https://oauth2.googleapis.com/token".into(),
//!     userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".into(),
//!     scopes: vec!["openid".into(), "email".into()],
//! }]);
//!
//! let secret = "a-signing-secret-of-at-least-32-bytes";
//! let auth = AuthService::new(
//!     Arc::new(MemoryUserStore::new()),
//!     TokenService::with_secret(secret),
//! );
//! let service = OidcService::new(
//!     registry,
//!     StateCodec::new(secret),
//!     auth,
//!     Arc::new(MemoryConnectionStore::new()),
//! );
//!
//! let provider = service.get_provider("google").unwrap();
//! let url = service
//!     .authorize_url(provider, Uuid::now_v7(), OidcMode::Login, None,
//!                    "https://panel.example.com/auth/oidc/callback")
//!     .unwrap();
//! ```

pub mod bridge;
pub mod http;
pub mod provider;
pub mod store;

// Re-export main types
pub use bridge::{CallbackResult, OidcService};
pub use http::{ProviderClient, TokenResponse, UserInfo};
pub use provider::{OidcProvider, ProviderInfo, ProviderRegistry};
pub use store::{ConnectionStore, IdentityConnection, MemoryConnectionStore};
