//! Project task repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use lumeo_core::{ProjectId, TaskId, TaskPriority, TaskStatus, UserId};

use super::RepositoryError;
use crate::listing::Pagination;
use crate::models::Task;

const TASK_COLUMNS: &str = "id, project_id, title, description, status, priority, assigned_to, \
                            due_date, estimated_hours, created_at, updated_at";

/// Internal row type for task queries.
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: TaskId,
    project_id: ProjectId,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    assigned_to: Option<UserId>,
    due_date: Option<NaiveDate>,
    estimated_hours: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status: TaskStatus = row
            .status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;
        let priority: TaskPriority = row
            .priority
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            description: row.description,
            status,
            priority,
            assigned_to: row.assigned_to,
            due_date: row.due_date,
            estimated_hours: row.estimated_hours,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Filters for task listings.
#[derive(Debug, Default)]
pub struct TaskFilter {
    /// Case-insensitive substring over title and description.
    pub search: Option<String>,
    pub project_id: Option<ProjectId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<UserId>,
}

/// Fields for creating a task.
#[derive(Debug)]
pub struct NewTask {
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: Option<UserId>,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<Decimal>,
}

/// Partial update of a task.
#[derive(Debug, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Option<UserId>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub estimated_hours: Option<Option<Decimal>>,
}

impl TaskUpdate {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assigned_to.is_none()
            && self.due_date.is_none()
            && self.estimated_hours.is_none()
    }
}

/// Repository for task database operations.
pub struct TaskRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TaskRepository<'a> {
    /// Create a new task repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
        if let Some(term) = &filter.search {
            let pattern = format!("%{term}%");
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(project_id) = filter.project_id {
            qb.push(" AND project_id = ").push_bind(project_id.as_uuid());
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(priority) = filter.priority {
            qb.push(" AND priority = ").push_bind(priority.as_str());
        }
        if let Some(assigned_to) = filter.assigned_to {
            qb.push(" AND assigned_to = ").push_bind(assigned_to.as_uuid());
        }
    }

    /// List tasks matching the filter, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(
        &self,
        filter: &TaskFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Task>, i64), RepositoryError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM project_tasks WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {TASK_COLUMNS} FROM project_tasks WHERE 1=1"
        ));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY updated_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<TaskRow> = qb.build_query_as().fetch_all(self.pool).await?;
        let tasks = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;
        Ok((tasks, total))
    }

    /// Get a task by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM project_tasks WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a task on a project.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the project or assignee
    /// doesn't exist. Returns `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: &NewTask) -> Result<Task, RepositoryError> {
        let row: TaskRow = sqlx::query_as(&format!(
            "INSERT INTO project_tasks \
             (id, project_id, title, description, status, priority, assigned_to, due_date, \
              estimated_hours) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(TaskId::generate().as_uuid())
        .bind(new.project_id.as_uuid())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.status.as_str())
        .bind(new.priority.as_str())
        .bind(new.assigned_to.map(|u| u.as_uuid()))
        .bind(new.due_date)
        .bind(new.estimated_hours)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_foreign_key(e, "referenced project or assignee does not exist")
        })?;

        row.try_into()
    }

    /// Apply a partial update to a task.
    ///
    /// An update with no changed fields returns the current record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the task doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: TaskId, update: &TaskUpdate) -> Result<Task, RepositoryError> {
        if update.is_empty() {
            return self.get(id).await?.ok_or(RepositoryError::NotFound);
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE project_tasks SET updated_at = NOW()");
        if let Some(title) = &update.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(description) = &update.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = update.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(priority) = update.priority {
            qb.push(", priority = ").push_bind(priority.as_str());
        }
        if let Some(assigned_to) = update.assigned_to {
            qb.push(", assigned_to = ")
                .push_bind(assigned_to.map(|u| u.as_uuid()));
        }
        if let Some(due_date) = update.due_date {
            qb.push(", due_date = ").push_bind(due_date);
        }
        if let Some(estimated_hours) = update.estimated_hours {
            qb.push(", estimated_hours = ").push_bind(estimated_hours);
        }
        qb.push(" WHERE id = ")
            .push_bind(id.as_uuid())
            .push(format!(" RETURNING {TASK_COLUMNS}"));

        let row: Option<TaskRow> = qb.build_query_as().fetch_optional(self.pool).await?;
        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete a task by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the task doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: TaskId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM project_tasks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Count tasks grouped by status (for the dashboard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_status(&self) -> Result<Vec<(String, i64)>, RepositoryError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM project_tasks GROUP BY status")
                .fetch_all(self.pool)
                .await?;
        Ok(rows)
    }
}
