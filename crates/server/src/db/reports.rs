//! Client report repository.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use lumeo_core::{ProjectId, ReportId, ReportType};

use super::RepositoryError;
use crate::listing::Pagination;
use crate::models::ClientReport;

const REPORT_COLUMNS: &str = "id, project_id, title, content, report_type, generated_at";

#[derive(Debug, sqlx::FromRow)]
struct ReportRow {
    id: ReportId,
    project_id: ProjectId,
    title: String,
    content: String,
    report_type: String,
    generated_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for ClientReport {
    type Error = RepositoryError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let report_type = row.report_type.parse::<ReportType>().map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "report {} has invalid type {:?}",
                row.id, row.report_type
            ))
        })?;

        Ok(Self {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            content: row.content,
            report_type,
            generated_at: row.generated_at,
        })
    }
}

/// Filters for report listings.
#[derive(Debug, Default)]
pub struct ReportFilter {
    /// Case-insensitive substring over the title.
    pub search: Option<String>,
    pub project_id: Option<ProjectId>,
    pub report_type: Option<ReportType>,
}

/// Fields for creating a report. Content is already sanitized by the caller.
#[derive(Debug)]
pub struct NewReport {
    pub project_id: ProjectId,
    pub title: String,
    pub content: String,
    pub report_type: ReportType,
}

/// Partial update of a report. Only title and content are editable after
/// generation.
#[derive(Debug, Default)]
pub struct ReportUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ReportUpdate {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Repository for client report database operations.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReportFilter) {
        if let Some(term) = &filter.search {
            qb.push(" AND title ILIKE ")
                .push_bind(format!("%{term}%"));
        }
        if let Some(project_id) = filter.project_id {
            qb.push(" AND project_id = ").push_bind(project_id.as_uuid());
        }
        if let Some(report_type) = filter.report_type {
            qb.push(" AND report_type = ")
                .push_bind(report_type.as_str());
        }
    }

    /// List reports, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(
        &self,
        filter: &ReportFilter,
        pagination: Pagination,
    ) -> Result<(Vec<ClientReport>, i64), RepositoryError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM client_reports WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {REPORT_COLUMNS} FROM client_reports WHERE 1=1"
        ));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY generated_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<ReportRow> = qb.build_query_as().fetch_all(self.pool).await?;
        let reports = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;
        Ok((reports, total))
    }

    /// Get a report by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(&self, id: ReportId) -> Result<Option<ClientReport>, RepositoryError> {
        let row: Option<ReportRow> = sqlx::query_as(&format!(
            "SELECT {REPORT_COLUMNS} FROM client_reports WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a report.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the project doesn't
    /// exist. Returns `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: &NewReport) -> Result<ClientReport, RepositoryError> {
        let row: ReportRow = sqlx::query_as(&format!(
            "INSERT INTO client_reports (id, project_id, title, content, report_type) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {REPORT_COLUMNS}"
        ))
        .bind(ReportId::generate().as_uuid())
        .bind(new.project_id.as_uuid())
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.report_type.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_foreign_key(e, "referenced project does not exist"))?;

        row.try_into()
    }

    /// Apply a partial update to a report.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the report doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ReportId,
        update: &ReportUpdate,
    ) -> Result<ClientReport, RepositoryError> {
        if update.is_empty() {
            return self.get(id).await?.ok_or(RepositoryError::NotFound);
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE client_reports SET id = id");
        if let Some(title) = &update.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(content) = &update.content {
            qb.push(", content = ").push_bind(content);
        }
        qb.push(" WHERE id = ")
            .push_bind(id.as_uuid())
            .push(format!(" RETURNING {REPORT_COLUMNS}"));

        let row: Option<ReportRow> = qb.build_query_as().fetch_optional(self.pool).await?;
        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete a report by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the report doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ReportId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM client_reports WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
