//! Partner domain model
//!
//! A partner is the tenant/brand boundary of the panel: a reseller brand
//! with its own hostname, look and feel, and user base. Every
//! authentication operation is scoped to a partner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a partner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PartnerStatus {
    /// Partner is live and serving its panel
    Active,
    /// Partner is suspended; its panel rejects logins
    Suspended,
}

impl PartnerStatus {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerStatus::Active => "active",
            PartnerStatus::Suspended => "suspended",
        }
    }
}

/// A partner (brand) under which user accounts exist.
///
/// The panel resolves the partner from the request hostname before any
/// authentication happens; the resolved `id` scopes user lookups and ends
/// up in token claims as `partner_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    /// Unique identifier for the partner
    pub id: Uuid,

    /// The brand this partner sells under
    pub brand_id: Uuid,

    /// Hostname the partner's panel is served on
    pub hostname: String,

    /// Human-readable name shown in the panel UI
    pub name: String,

    /// Support contact shown to the partner's customers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_email: Option<String>,

    /// Logo URL for branding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// Lifecycle status
    pub status: PartnerStatus,

    /// When the partner was created
    pub created_at: DateTime<Utc>,

    /// When the partner was last updated
    pub updated_at: DateTime<Utc>,
}

impl Partner {
    /// Creates a new active partner.
    ///
    /// # Arguments
    ///
    /// * `brand_id` - The brand this partner belongs to
    /// * `hostname` - Hostname the partner panel answers on
    /// * `name` - Display name
    pub fn new(brand_id: Uuid, hostname: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            brand_id,
            hostname: hostname.into(),
            name: name.into(),
            support_email: None,
            logo_url: None,
            status: PartnerStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the partner currently accepts logins.
    pub fn is_active(&self) -> bool {
        self.status == PartnerStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_partner_is_active() {
        let partner = Partner::new(Uuid::now_v7(), "panel.acme-hosting.test", "Acme Hosting");
        assert!(partner.is_active());
        assert_eq!(partner.status.as_str(), "active");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&PartnerStatus::Suspended).unwrap();
        assert_eq!(json, "\"suspended\"");
    }
}
