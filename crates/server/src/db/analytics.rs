//! Analytics event repository. Events are write-only from the public API.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use lumeo_core::AnalyticsEventId;

use super::RepositoryError;

/// An analytics event accepted from the public tracking endpoint.
#[derive(Debug)]
pub struct NewAnalyticsEvent {
    pub event: String,
    pub page: Option<String>,
    pub referrer: Option<String>,
    pub properties: Value,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Repository for analytics event writes.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    /// Create a new analytics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an event. A missing `occurred_at` defaults to now.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, new: &NewAnalyticsEvent) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO analytics_events (id, event, page, referrer, properties, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))",
        )
        .bind(AnalyticsEventId::generate().as_uuid())
        .bind(&new.event)
        .bind(&new.page)
        .bind(&new.referrer)
        .bind(&new.properties)
        .bind(new.occurred_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
