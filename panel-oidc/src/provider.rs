//! OIDC provider configuration
//!
//! Providers are loaded from static configuration at process start and
//! read-only afterwards, so the registry needs no synchronization for
//! concurrent reads. Lookups are indexed by provider id; listing keeps
//! configuration order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for a single OIDC provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcProvider {
    /// Stable provider id used in URLs and stored connections
    pub id: String,

    /// Human-readable name shown on the login page
    pub name: String,

    /// OAuth client id registered with the provider
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Authorization endpoint
    pub authorize_url: String,

    /// Token endpoint
    pub token_url: String,

    /// Userinfo endpoint
    pub userinfo_url: String,

    /// Scopes to request
    pub scopes: Vec<String>,
}

impl OidcProvider {
    /// The space-joined scope string for the authorize URL.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Public-facing provider summary: what the login page needs, no secrets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderInfo {
    /// Provider id
    pub id: String,

    /// Display name
    pub name: String,
}

/// Immutable snapshot of the configured providers, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<OidcProvider>,
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    /// Build a registry from configured providers.
    ///
    /// If two providers share an id, the later one wins the index slot;
    /// configuration validation upstream should prevent that.
    pub fn new(providers: Vec<OidcProvider>) -> Self {
        let index = providers
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Self { providers, index }
    }

    /// Look up a provider by id.
    pub fn get(&self, id: &str) -> Option<&OidcProvider> {
        self.index.get(id).map(|&i| &self.providers[i])
    }

    /// The enabled providers in configuration order, without secrets.
    pub fn infos(&self) -> Vec<ProviderInfo> {
        self.providers
            .iter()
            .map(|p| ProviderInfo {
                id: p.id.clone(),
                name: p.name.clone(),
            })
            .collect()
    }

    /// Number of configured providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no providers are configured.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
