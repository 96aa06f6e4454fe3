//! Project and task domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use lumeo_core::{ContactId, ProjectId, ProjectStatus, TaskId, TaskPriority, TaskStatus, UserId};

/// A client project (domain type).
///
/// Money fields stay [`Decimal`] here; conversion to floating values
/// happens only in the response shapes.
#[derive(Debug, Clone)]
pub struct Project {
    /// Unique project ID.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Delivery status.
    pub status: ProjectStatus,
    /// Agreed budget (fixed-point).
    pub budget: Option<Decimal>,
    /// Actual cost to date (fixed-point).
    pub actual_cost: Option<Decimal>,
    /// Owning contact.
    pub contact_id: ContactId,
    /// Managing admin user, if assigned.
    pub manager_id: Option<UserId>,
    /// Live website URL, if any.
    pub website_url: Option<String>,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
    /// When the project was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A project row joined with display-only relations for listings.
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub project: Project,
    /// Owning contact's name (read-only join).
    pub contact_name: String,
    /// Number of tasks not yet done (read-only join).
    pub open_task_count: i64,
}

/// A task belonging to exactly one project.
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique task ID.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Task title.
    pub title: String,
    /// Longer description, if any.
    pub description: Option<String>,
    /// Board status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Assigned admin user, if any.
    pub assigned_to: Option<UserId>,
    /// Due date, if set.
    pub due_date: Option<NaiveDate>,
    /// Estimated hours, if set.
    pub estimated_hours: Option<Decimal>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated.
    pub updated_at: DateTime<Utc>,
}
