//! Sales contact domain types.

use chrono::{DateTime, Utc};

use lumeo_core::{ContactId, ContactStatus, Email, UserId};

/// A sales contact (domain type).
///
/// Created by public contact-form or booking submissions, then worked by
/// admins through status changes and assignment. Contacts are never
/// hard-deleted.
#[derive(Debug, Clone)]
pub struct Contact {
    /// Unique contact ID.
    pub id: ContactId,
    /// Contact's name.
    pub name: String,
    /// Contact's email address.
    pub email: Email,
    /// Company the contact represents.
    pub company: Option<String>,
    /// Industry vertical, free-form.
    pub industry: Option<String>,
    /// Free-form message from the intake form.
    pub message: Option<String>,
    /// Lifecycle status.
    pub status: ContactStatus,
    /// Admin user working this contact, if any.
    pub assigned_to: Option<UserId>,
    /// When the contact was created.
    pub created_at: DateTime<Utc>,
    /// When the contact was last updated.
    pub updated_at: DateTime<Utc>,
}
