//! Admin-panel user domain types.
//!
//! A user is dual-homed: a `users` row here plus an account at the external
//! identity provider, kept in sync by the directory saga in the user routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lumeo_core::{Email, UserId, UserRole};

/// An admin-panel user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID (shared with the identity provider account).
    pub id: UserId,
    /// User's email address (unique).
    pub email: Email,
    /// User's display name.
    pub name: String,
    /// Directory role. Data only; not an access-control boundary.
    pub role: UserRole,
    /// Most recent login, if any.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Session-stored identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's display name.
    pub name: String,
    /// Directory role.
    pub role: UserRole,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
