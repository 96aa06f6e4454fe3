//! SEO ranking repository. Rankings are append-only measurements.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use lumeo_core::{ProjectId, RankingId};

use super::RepositoryError;
use crate::listing::Pagination;
use crate::models::SeoRanking;

const RANKING_COLUMNS: &str =
    "id, project_id, keyword, url, location, search_engine, position, recorded_at";

/// Trend window applied when the caller supplies no date bounds.
pub const DEFAULT_TREND_WINDOW_DAYS: i64 = 90;

#[derive(Debug, sqlx::FromRow)]
struct RankingRow {
    id: RankingId,
    project_id: ProjectId,
    keyword: String,
    url: String,
    location: Option<String>,
    search_engine: String,
    position: i32,
    recorded_at: DateTime<Utc>,
}

impl From<RankingRow> for SeoRanking {
    fn from(row: RankingRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            keyword: row.keyword,
            url: row.url,
            location: row.location,
            search_engine: row.search_engine,
            position: row.position,
            recorded_at: row.recorded_at,
        }
    }
}

/// Filters for ranking listings and trend queries.
#[derive(Debug, Default)]
pub struct RankingFilter {
    /// Case-insensitive substring over keyword and url.
    pub search: Option<String>,
    pub project_id: Option<ProjectId>,
    pub search_engine: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// Fields for recording a new ranking measurement.
#[derive(Debug)]
pub struct NewRanking {
    pub project_id: ProjectId,
    pub keyword: String,
    pub url: String,
    pub location: Option<String>,
    pub search_engine: String,
    pub position: i32,
}

/// Repository for SEO ranking database operations.
pub struct RankingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RankingRepository<'a> {
    /// Create a new ranking repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &RankingFilter) {
        if let Some(term) = &filter.search {
            let pattern = format!("%{term}%");
            qb.push(" AND (keyword ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR url ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(project_id) = filter.project_id {
            qb.push(" AND project_id = ").push_bind(project_id.as_uuid());
        }
        if let Some(engine) = &filter.search_engine {
            qb.push(" AND search_engine = ").push_bind(engine.clone());
        }
        if let Some(from) = filter.date_from {
            qb.push(" AND recorded_at >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            qb.push(" AND recorded_at <= ").push_bind(to);
        }
    }

    /// List rankings, newest measurement first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &RankingFilter,
        pagination: Pagination,
    ) -> Result<(Vec<SeoRanking>, i64), RepositoryError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM seo_rankings WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {RANKING_COLUMNS} FROM seo_rankings WHERE 1=1"
        ));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY recorded_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<RankingRow> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// All matching measurements in chronological order, for trend series.
    ///
    /// Callers that give no date bounds get the last
    /// [`DEFAULT_TREND_WINDOW_DAYS`] days so the series stays bounded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_trends(
        &self,
        filter: &RankingFilter,
    ) -> Result<Vec<SeoRanking>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {RANKING_COLUMNS} FROM seo_rankings WHERE 1=1"
        ));
        Self::push_filters(&mut qb, filter);
        if filter.date_from.is_none() && filter.date_to.is_none() {
            let cutoff = Utc::now() - chrono::Duration::days(DEFAULT_TREND_WINDOW_DAYS);
            qb.push(" AND recorded_at >= ").push_bind(cutoff);
        }
        qb.push(" ORDER BY recorded_at ASC");

        let rows: Vec<RankingRow> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Record a new ranking measurement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the project doesn't
    /// exist. Returns `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: &NewRanking) -> Result<SeoRanking, RepositoryError> {
        let row: RankingRow = sqlx::query_as(&format!(
            "INSERT INTO seo_rankings \
             (id, project_id, keyword, url, location, search_engine, position) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {RANKING_COLUMNS}"
        ))
        .bind(RankingId::generate().as_uuid())
        .bind(new.project_id.as_uuid())
        .bind(&new.keyword)
        .bind(&new.url)
        .bind(&new.location)
        .bind(&new.search_engine)
        .bind(new.position)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_foreign_key(e, "referenced project does not exist"))?;

        Ok(row.into())
    }
}
