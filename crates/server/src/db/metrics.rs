//! Website metrics repository. Metrics are append-only snapshots with an
//! aggregated summary for the dashboard.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use lumeo_core::{MetricsId, ProjectId};

use super::RepositoryError;
use crate::listing::Pagination;
use crate::models::WebsiteMetrics;

const METRICS_COLUMNS: &str = "id, project_id, uptime, response_time, page_speed, seo_score, \
                               traffic_count, conversion_rate, recorded_at";

#[derive(Debug, sqlx::FromRow)]
struct MetricsRow {
    id: MetricsId,
    project_id: Option<ProjectId>,
    uptime: Decimal,
    response_time: Decimal,
    page_speed: i32,
    seo_score: i32,
    traffic_count: i64,
    conversion_rate: Decimal,
    recorded_at: DateTime<Utc>,
}

impl From<MetricsRow> for WebsiteMetrics {
    fn from(row: MetricsRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            uptime: row.uptime,
            response_time: row.response_time,
            page_speed: row.page_speed,
            seo_score: row.seo_score,
            traffic_count: row.traffic_count,
            conversion_rate: row.conversion_rate,
            recorded_at: row.recorded_at,
        }
    }
}

/// Filters for metrics listings.
#[derive(Debug, Default)]
pub struct MetricsFilter {
    pub project_id: Option<ProjectId>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// Fields for recording a metrics snapshot.
#[derive(Debug)]
pub struct NewMetrics {
    pub project_id: Option<ProjectId>,
    pub uptime: Decimal,
    pub response_time: Decimal,
    pub page_speed: i32,
    pub seo_score: i32,
    pub traffic_count: i64,
    pub conversion_rate: Decimal,
}

/// Averages over the matching snapshots. `None` fields mean no rows matched.
#[derive(Debug, sqlx::FromRow)]
pub struct MetricsSummary {
    pub avg_uptime: Option<Decimal>,
    pub avg_response_time: Option<Decimal>,
    pub avg_page_speed: Option<Decimal>,
    pub avg_seo_score: Option<Decimal>,
    pub total_traffic: Option<i64>,
    pub avg_conversion_rate: Option<Decimal>,
}

/// Repository for website metrics database operations.
pub struct MetricsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MetricsRepository<'a> {
    /// Create a new metrics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &MetricsFilter) {
        if let Some(project_id) = filter.project_id {
            qb.push(" AND project_id = ").push_bind(project_id.as_uuid());
        }
        if let Some(from) = filter.date_from {
            qb.push(" AND recorded_at >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            qb.push(" AND recorded_at <= ").push_bind(to);
        }
    }

    /// List snapshots, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &MetricsFilter,
        pagination: Pagination,
    ) -> Result<(Vec<WebsiteMetrics>, i64), RepositoryError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM website_metrics WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {METRICS_COLUMNS} FROM website_metrics WHERE 1=1"
        ));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY recorded_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<MetricsRow> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Aggregate averages across the matching snapshots.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(
        &self,
        filter: &MetricsFilter,
    ) -> Result<MetricsSummary, RepositoryError> {
        // sum(bigint) is NUMERIC in Postgres; cast back so it decodes as i64.
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT AVG(uptime) AS avg_uptime, \
                    AVG(response_time) AS avg_response_time, \
                    AVG(page_speed) AS avg_page_speed, \
                    AVG(seo_score) AS avg_seo_score, \
                    SUM(traffic_count)::BIGINT AS total_traffic, \
                    AVG(conversion_rate) AS avg_conversion_rate \
             FROM website_metrics WHERE 1=1",
        );
        Self::push_filters(&mut qb, filter);

        let summary: MetricsSummary = qb.build_query_as().fetch_one(self.pool).await?;
        Ok(summary)
    }

    /// Record a metrics snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the project doesn't
    /// exist. Returns `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: &NewMetrics) -> Result<WebsiteMetrics, RepositoryError> {
        let row: MetricsRow = sqlx::query_as(&format!(
            "INSERT INTO website_metrics \
             (id, project_id, uptime, response_time, page_speed, seo_score, traffic_count, \
              conversion_rate) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {METRICS_COLUMNS}"
        ))
        .bind(MetricsId::generate().as_uuid())
        .bind(new.project_id.map(|p| p.as_uuid()))
        .bind(new.uptime)
        .bind(new.response_time)
        .bind(new.page_speed)
        .bind(new.seo_score)
        .bind(new.traffic_count)
        .bind(new.conversion_rate)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_foreign_key(e, "referenced project does not exist"))?;

        Ok(row.into())
    }
}
