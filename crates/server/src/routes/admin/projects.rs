//! Admin project management.
//!
//! Monetary fields are stored as `NUMERIC` decimals and converted to `f64`
//! only here, at the response boundary.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumeo_core::{ContactId, ProjectId, ProjectStatus, UserId};

use crate::db::ProjectRepository;
use crate::db::projects::{NewProject, ProjectFilter, ProjectUpdate};
use crate::error::AppError;
use crate::listing::{ListQuery, Listing};
use crate::middleware::RequireAuth;
use crate::models::{Project, ProjectSummary};
use crate::sanitize::{sanitize_optional_text, sanitize_text};
use crate::state::AppState;

use super::{deserialize_some, parse_filter};

fn to_f64(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    pub budget: Option<f64>,
    pub actual_cost: Option<f64>,
    pub contact_id: ContactId,
    pub manager_id: Option<UserId>,
    pub website_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            status: project.status,
            budget: to_f64(project.budget),
            actual_cost: to_f64(project.actual_cost),
            contact_id: project.contact_id,
            manager_id: project.manager_id,
            website_url: project.website_url,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// List row: the project plus its joined contact name and open-task count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummaryResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub contact_name: String,
    pub open_task_count: i64,
}

impl From<ProjectSummary> for ProjectSummaryResponse {
    fn from(summary: ProjectSummary) -> Self {
        Self {
            project: summary.project.into(),
            contact_name: summary.contact_name,
            open_task_count: summary.open_task_count,
        }
    }
}

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<ProjectSummaryResponse>>, AppError> {
    let filter = ProjectFilter {
        search: query.term(),
        status: parse_filter(query.status.as_deref(), "status")?,
        contact_id: None,
    };
    let pagination = query.pagination();

    let (projects, total) = ProjectRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    let items = projects
        .into_iter()
        .map(ProjectSummaryResponse::from)
        .collect();
    Ok(Json(Listing::new(items, pagination, total)))
}

#[instrument(skip_all, fields(project_id = %id))]
pub async fn detail(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<ProjectResponse>, AppError> {
    let project = ProjectRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("project not found".to_owned()))?;
    Ok(Json(project.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    pub name: String,
    pub contact_id: ContactId,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub budget: Option<Decimal>,
    #[serde(default)]
    pub actual_cost: Option<Decimal>,
    #[serde(default)]
    pub manager_id: Option<UserId>,
    #[serde(default)]
    pub website_url: Option<String>,
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<(StatusCode, Json<ProjectResponse>), AppError> {
    let name = sanitize_text(&payload.name);
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }

    let project = ProjectRepository::new(state.pool())
        .create(&NewProject {
            name,
            contact_id: payload.contact_id,
            status: payload.status.unwrap_or(ProjectStatus::Planning),
            budget: payload.budget,
            actual_cost: payload.actual_cost,
            manager_id: payload.manager_id,
            website_url: sanitize_optional_text(payload.website_url.as_deref()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(project.into())))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectPayload {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub budget: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub actual_cost: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub manager_id: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub website_url: Option<Option<String>>,
}

#[instrument(skip_all, fields(project_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    Json(payload): Json<UpdateProjectPayload>,
) -> Result<Json<ProjectResponse>, AppError> {
    let project = ProjectRepository::new(state.pool())
        .update(
            id,
            &ProjectUpdate {
                name: payload.name.as_deref().map(sanitize_text),
                status: payload.status,
                budget: payload.budget,
                actual_cost: payload.actual_cost,
                manager_id: payload.manager_id,
                website_url: payload
                    .website_url
                    .map(|url| sanitize_optional_text(url.as_deref())),
            },
        )
        .await?;
    Ok(Json(project.into()))
}

#[instrument(skip_all, fields(project_id = %id))]
pub async fn remove(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> Result<StatusCode, AppError> {
    ProjectRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
