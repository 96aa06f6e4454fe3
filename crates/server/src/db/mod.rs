//! Database operations for `PostgreSQL`.
//!
//! ## Tables
//!
//! - `contacts` - Sales contacts from public intake
//! - `projects` - Client projects (budget/actual cost as NUMERIC)
//! - `project_tasks` - Tasks belonging to a project
//! - `users` - Admin-panel users (dual-homed with the identity provider)
//! - `blog_posts` - Published and draft posts (sanitized HTML content)
//! - `seo_rankings` - Keyword position snapshots per project
//! - `website_metrics` - Uptime/performance snapshots per project
//! - `client_reports` - Generated reports per project
//! - `revenues` - Revenue entries per project
//! - `email_templates` - Stored templates with extracted variables
//! - `app_settings` - Key/value configuration overrides
//! - `rate_limit_windows` - Fixed-window request counters
//! - `analytics_events` - Public analytics ingestion
//! - `sessions` - tower-sessions storage
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p lumeo-cli -- migrate
//! ```

pub mod analytics;
pub mod blog_posts;
pub mod contacts;
pub mod metrics;
pub mod projects;
pub mod rankings;
pub mod rate_limits;
pub mod reports;
pub mod revenues;
pub mod settings;
pub mod tasks;
pub mod templates;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use analytics::AnalyticsRepository;
pub use blog_posts::BlogPostRepository;
pub use contacts::ContactRepository;
pub use metrics::MetricsRepository;
pub use projects::ProjectRepository;
pub use rankings::RankingRepository;
pub use rate_limits::RateLimitRepository;
pub use reports::ReportRepository;
pub use revenues::RevenueRepository;
pub use tasks::TaskRepository;
pub use templates::TemplateRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A referenced entity does not exist (foreign key violation).
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into [`Self::Conflict`].
    pub(crate) fn from_unique(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(err)
    }

    /// Map a sqlx error, turning foreign-key violations into
    /// [`Self::InvalidReference`].
    pub(crate) fn from_foreign_key(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_foreign_key_violation()
        {
            return Self::InvalidReference(message.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
