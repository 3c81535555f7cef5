//! # Hostpanel Core Domain Model
//!
//! This crate provides the partner/user domain model shared across the
//! Hostpanel control panel services (panel API, admin UI, CLI tooling).
//!
//! ## Overview
//!
//! The panel-core crate handles:
//! - **Partners**: The tenant/brand boundary under which user accounts exist
//! - **Users**: Partner-scoped user accounts
//! - **Persistence contract**: The abstract query interface the
//!   authentication core needs, with an in-memory implementation for tests
//!
//! ## Architecture
//!
//! ```text
//! Partner (brand/tenant boundary)
//!   └─ User (email unique within partner)
//!        └─ consumed by panel-auth / panel-oidc
//! ```
//!
//! All authentication in the panel is partner-scoped: the same email may
//! exist under different partners as distinct users. This crate is
//! intentionally free of crypto and I/O concerns; those live in
//! `panel-auth` and `panel-oidc`.

pub mod partner;
pub mod store;
pub mod user;

// Re-export main types
pub use partner::{Partner, PartnerStatus};
pub use store::{MemoryUserStore, StoreError, StoreResult, UserStore};
pub use user::User;
