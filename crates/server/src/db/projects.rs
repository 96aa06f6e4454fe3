//! Project repository for database operations.
//!
//! Listings join the owning contact's name and an open-task count for
//! display; those joins are read-only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use lumeo_core::{ContactId, ProjectId, ProjectStatus, UserId};

use super::RepositoryError;
use crate::listing::Pagination;
use crate::models::{Project, ProjectSummary};

const PROJECT_COLUMNS: &str = "id, name, status, budget, actual_cost, contact_id, manager_id, \
                               website_url, created_at, updated_at";

/// Internal row type for project queries.
#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: ProjectId,
    name: String,
    status: String,
    budget: Option<Decimal>,
    actual_cost: Option<Decimal>,
    contact_id: ContactId,
    manager_id: Option<UserId>,
    website_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = RepositoryError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let status: ProjectStatus = row
            .status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: row.id,
            name: row.name,
            status,
            budget: row.budget,
            actual_cost: row.actual_cost,
            contact_id: row.contact_id,
            manager_id: row.manager_id,
            website_url: row.website_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for project listings with joined display fields.
#[derive(Debug, sqlx::FromRow)]
struct ProjectSummaryRow {
    #[sqlx(flatten)]
    project: ProjectRow,
    contact_name: String,
    open_task_count: i64,
}

impl TryFrom<ProjectSummaryRow> for ProjectSummary {
    type Error = RepositoryError;

    fn try_from(row: ProjectSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            project: row.project.try_into()?,
            contact_name: row.contact_name,
            open_task_count: row.open_task_count,
        })
    }
}

/// Filters for project listings.
#[derive(Debug, Default)]
pub struct ProjectFilter {
    /// Case-insensitive substring over the project name.
    pub search: Option<String>,
    pub status: Option<ProjectStatus>,
    pub contact_id: Option<ContactId>,
}

/// Fields for creating a project.
#[derive(Debug)]
pub struct NewProject {
    pub name: String,
    pub contact_id: ContactId,
    pub status: ProjectStatus,
    pub budget: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub manager_id: Option<UserId>,
    pub website_url: Option<String>,
}

/// Partial update of a project.
#[derive(Debug, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub budget: Option<Option<Decimal>>,
    pub actual_cost: Option<Option<Decimal>>,
    pub manager_id: Option<Option<UserId>>,
    pub website_url: Option<Option<String>>,
}

impl ProjectUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.budget.is_none()
            && self.actual_cost.is_none()
            && self.manager_id.is_none()
            && self.website_url.is_none()
    }
}

/// Repository for project database operations.
pub struct ProjectRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProjectRepository<'a> {
    /// Create a new project repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProjectFilter) {
        if let Some(term) = &filter.search {
            qb.push(" AND p.name ILIKE ")
                .push_bind(format!("%{term}%"));
        }
        if let Some(status) = filter.status {
            qb.push(" AND p.status = ").push_bind(status.as_str());
        }
        if let Some(contact_id) = filter.contact_id {
            qb.push(" AND p.contact_id = ").push_bind(contact_id.as_uuid());
        }
    }

    /// List projects with joined contact name and open-task count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(
        &self,
        filter: &ProjectFilter,
        pagination: Pagination,
    ) -> Result<(Vec<ProjectSummary>, i64), RepositoryError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects p WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT p.id, p.name, p.status, p.budget, p.actual_cost, p.contact_id, \
                    p.manager_id, p.website_url, p.created_at, p.updated_at, \
                    c.name AS contact_name, \
                    (SELECT COUNT(*) FROM project_tasks t \
                     WHERE t.project_id = p.id AND t.status <> 'DONE') AS open_task_count \
             FROM projects p JOIN contacts c ON c.id = p.contact_id WHERE 1=1",
        );
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY p.updated_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<ProjectSummaryRow> = qb.build_query_as().fetch_all(self.pool).await?;
        let projects = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;
        Ok((projects, total))
    }

    /// Get a project by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a project from a contact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the contact or manager
    /// doesn't exist. Returns `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: &NewProject) -> Result<Project, RepositoryError> {
        let row: ProjectRow = sqlx::query_as(&format!(
            "INSERT INTO projects \
             (id, name, status, budget, actual_cost, contact_id, manager_id, website_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(ProjectId::generate().as_uuid())
        .bind(&new.name)
        .bind(new.status.as_str())
        .bind(new.budget)
        .bind(new.actual_cost)
        .bind(new.contact_id.as_uuid())
        .bind(new.manager_id.map(|u| u.as_uuid()))
        .bind(&new.website_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_foreign_key(e, "referenced contact or manager does not exist")
        })?;

        row.try_into()
    }

    /// Apply a partial update to a project.
    ///
    /// An update with no changed fields returns the current record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the project doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProjectId,
        update: &ProjectUpdate,
    ) -> Result<Project, RepositoryError> {
        if update.is_empty() {
            return self.get(id).await?.ok_or(RepositoryError::NotFound);
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE projects SET updated_at = NOW()");
        if let Some(name) = &update.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(status) = update.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(budget) = update.budget {
            qb.push(", budget = ").push_bind(budget);
        }
        if let Some(actual_cost) = update.actual_cost {
            qb.push(", actual_cost = ").push_bind(actual_cost);
        }
        if let Some(manager_id) = update.manager_id {
            qb.push(", manager_id = ")
                .push_bind(manager_id.map(|u| u.as_uuid()));
        }
        if let Some(website_url) = &update.website_url {
            qb.push(", website_url = ").push_bind(website_url.clone());
        }
        qb.push(" WHERE id = ")
            .push_bind(id.as_uuid())
            .push(format!(" RETURNING {PROJECT_COLUMNS}"));

        let row: Option<ProjectRow> = qb.build_query_as().fetch_optional(self.pool).await?;
        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete a project by ID.
    ///
    /// Cascades to its tasks, rankings, metrics, reports, and revenues.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the project doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProjectId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Total number of projects.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Count projects grouped by status (for the dashboard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_status(&self) -> Result<Vec<(String, i64)>, RepositoryError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM projects GROUP BY status")
                .fetch_all(self.pool)
                .await?;
        Ok(rows)
    }
}
