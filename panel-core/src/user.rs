//! User domain model
//!
//! Users are partner-scoped accounts. The same email address may exist
//! under different partners as entirely distinct users, so every lookup
//! carries the owning partner id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account belonging to exactly one partner.
///
/// The `password_hash` field holds the opaque PHC-format hash produced at
/// provisioning time and is never serialized outward, so API responses
/// built from this type cannot leak it.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use panel_core::User;
///
/// let partner_id = Uuid::now_v7();
/// let user = User::new(partner_id, "admin@acme-hosting.test", "$argon2id$...");
/// assert_eq!(user.partner_id, partner_id);
/// assert_eq!(user.locale, "en");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Owning partner (tenant boundary)
    pub partner_id: Uuid,

    /// Email address (unique within the partner)
    pub email: String,

    /// PHC-format password hash. Opaque to everything except the
    /// credential verifier; never serialized outward.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Optional display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// BCP 47 locale tag used for panel UI and token claims
    pub locale: String,

    /// The customer account the user last operated on, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_customer_id: Option<Uuid>,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user under the given partner.
    ///
    /// The user is created with a generated UUID v7 id, the default "en"
    /// locale, and current timestamps. Signup and admin provisioning flows
    /// build on this before persisting.
    ///
    /// # Arguments
    ///
    /// * `partner_id` - The owning partner
    /// * `email` - Email address, unique within the partner
    /// * `password_hash` - PHC-format hash from the credential verifier
    pub fn new(
        partner_id: Uuid,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            partner_id,
            email: email.into(),
            password_hash: password_hash.into(),
            display_name: None,
            locale: "en".to_string(),
            last_customer_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// The name to show in the panel UI, falling back to the email.
    pub fn display_label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}
