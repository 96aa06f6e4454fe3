//! Admin task management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumeo_core::{ProjectId, TaskId, TaskPriority, TaskStatus, UserId};

use crate::db::TaskRepository;
use crate::db::tasks::{NewTask, TaskFilter, TaskUpdate};
use crate::error::AppError;
use crate::listing::{ListQuery, Listing};
use crate::middleware::RequireAuth;
use crate::models::Task;
use crate::sanitize::{sanitize_optional_text, sanitize_text};
use crate::state::AppState;

use super::{deserialize_some, parse_filter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: Option<UserId>,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            project_id: task.project_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            assigned_to: task.assigned_to,
            due_date: task.due_date,
            estimated_hours: task.estimated_hours.and_then(|d| d.to_f64()),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<TaskResponse>>, AppError> {
    let filter = TaskFilter {
        search: query.term(),
        project_id: parse_filter(query.project_id.as_deref(), "projectId")?,
        status: parse_filter(query.status.as_deref(), "status")?,
        priority: parse_filter(query.priority.as_deref(), "priority")?,
        assigned_to: parse_filter(query.assigned_to.as_deref(), "assignedTo")?,
    };
    let pagination = query.pagination();

    let (tasks, total) = TaskRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    let items = tasks.into_iter().map(TaskResponse::from).collect();
    Ok(Json(Listing::new(items, pagination, total)))
}

#[instrument(skip_all, fields(task_id = %id))]
pub async fn detail(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> Result<Json<TaskResponse>, AppError> {
    let task = TaskRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".to_owned()))?;
    Ok(Json(task.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_hours: Option<Decimal>,
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<(StatusCode, Json<TaskResponse>), AppError> {
    let title = sanitize_text(&payload.title);
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_owned()));
    }

    let task = TaskRepository::new(state.pool())
        .create(&NewTask {
            project_id: payload.project_id,
            title,
            description: sanitize_optional_text(payload.description.as_deref()),
            status: payload.status.unwrap_or(TaskStatus::Todo),
            priority: payload.priority.unwrap_or_default(),
            assigned_to: payload.assigned_to,
            due_date: payload.due_date,
            estimated_hours: payload.estimated_hours,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(task.into())))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub assigned_to: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub estimated_hours: Option<Option<Decimal>>,
}

#[instrument(skip_all, fields(task_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<Json<TaskResponse>, AppError> {
    let task = TaskRepository::new(state.pool())
        .update(
            id,
            &TaskUpdate {
                title: payload.title.as_deref().map(sanitize_text),
                description: payload
                    .description
                    .map(|d| sanitize_optional_text(d.as_deref())),
                status: payload.status,
                priority: payload.priority,
                assigned_to: payload.assigned_to,
                due_date: payload.due_date,
                estimated_hours: payload.estimated_hours,
            },
        )
        .await?;
    Ok(Json(task.into()))
}

#[instrument(skip_all, fields(task_id = %id))]
pub async fn remove(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> Result<StatusCode, AppError> {
    TaskRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
