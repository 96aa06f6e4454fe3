//! Blog post domain types.

use chrono::{DateTime, Utc};

use lumeo_core::BlogPostId;

/// A blog post (domain type).
///
/// Invariant: `published_at` is non-null iff `published` is true. The
/// repository enforces this on every write.
#[derive(Debug, Clone)]
pub struct BlogPost {
    /// Unique post ID.
    pub id: BlogPostId,
    /// Post title (sanitized plain text).
    pub title: String,
    /// URL slug (unique).
    pub slug: String,
    /// Short excerpt shown in listings and the feed.
    pub excerpt: Option<String>,
    /// Sanitized HTML body.
    pub content: String,
    /// Whether the post is publicly visible.
    pub published: bool,
    /// Publish timestamp; set and cleared in lockstep with `published`.
    pub published_at: Option<DateTime<Utc>>,
    /// Category label.
    pub category: Option<String>,
    /// Tag set.
    pub tags: Vec<String>,
    /// Author display name.
    pub author: Option<String>,
    /// Featured image URL, if any.
    pub featured_image: Option<String>,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
    /// When the post was last updated.
    pub updated_at: DateTime<Utc>,
}
