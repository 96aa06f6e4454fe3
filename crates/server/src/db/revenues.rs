//! Revenue entry repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use lumeo_core::{ProjectId, RevenueId};

use super::RepositoryError;
use crate::listing::Pagination;
use crate::models::Revenue;

const REVENUE_COLUMNS: &str = "id, project_id, amount, description, recorded_at";

#[derive(Debug, sqlx::FromRow)]
struct RevenueRow {
    id: RevenueId,
    project_id: ProjectId,
    amount: Decimal,
    description: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl From<RevenueRow> for Revenue {
    fn from(row: RevenueRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            amount: row.amount,
            description: row.description,
            recorded_at: row.recorded_at,
        }
    }
}

/// Filters for revenue listings and totals.
#[derive(Debug, Default)]
pub struct RevenueFilter {
    pub project_id: Option<ProjectId>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// Fields for recording a revenue entry.
#[derive(Debug)]
pub struct NewRevenue {
    pub project_id: ProjectId,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Repository for revenue database operations.
pub struct RevenueRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RevenueRepository<'a> {
    /// Create a new revenue repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &RevenueFilter) {
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

    /// List revenue entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &RevenueFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Revenue>, i64), RepositoryError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM revenues WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {REVENUE_COLUMNS} FROM revenues WHERE 1=1"
        ));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY recorded_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<RevenueRow> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Sum of amounts across the matching entries. Zero when none match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total(&self, filter: &RevenueFilter) -> Result<Decimal, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COALESCE(SUM(amount), 0) FROM revenues WHERE 1=1",
        );
        Self::push_filters(&mut qb, filter);

        let total: Decimal = qb.build_query_scalar().fetch_one(self.pool).await?;
        Ok(total)
    }

    /// Record a revenue entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the project doesn't
    /// exist. Returns `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: &NewRevenue) -> Result<Revenue, RepositoryError> {
        let row: RevenueRow = sqlx::query_as(&format!(
            "INSERT INTO revenues (id, project_id, amount, description) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {REVENUE_COLUMNS}"
        ))
        .bind(RevenueId::generate().as_uuid())
        .bind(new.project_id.as_uuid())
        .bind(new.amount)
        .bind(&new.description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_foreign_key(e, "referenced project does not exist"))?;

        Ok(row.into())
    }
}
