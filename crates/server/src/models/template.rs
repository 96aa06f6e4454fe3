//! Email template domain type.

use chrono::{DateTime, Utc};

use lumeo_core::TemplateId;

/// A stored email template.
///
/// `variables` holds the distinct `{{placeholder}}` names extracted from
/// the subject and content at write time.
#[derive(Debug, Clone)]
pub struct EmailTemplate {
    pub id: TemplateId,
    /// Template name (unique).
    pub name: String,
    pub subject: String,
    pub content: String,
    pub category: Option<String>,
    /// Extracted `{{...}}` placeholder names.
    pub variables: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
