//! Admin client reports. Only title and content are editable after
//! generation.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumeo_core::{ProjectId, ReportId, ReportType};

use crate::db::ReportRepository;
use crate::db::reports::{NewReport, ReportFilter, ReportUpdate};
use crate::error::AppError;
use crate::listing::{ListQuery, Listing};
use crate::middleware::RequireAuth;
use crate::models::ClientReport;
use crate::sanitize::{sanitize_html, sanitize_text};
use crate::state::AppState;

use super::parse_filter;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: ReportId,
    pub project_id: ProjectId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub generated_at: DateTime<Utc>,
}

impl From<ClientReport> for ReportResponse {
    fn from(report: ClientReport) -> Self {
        Self {
            id: report.id,
            project_id: report.project_id,
            title: report.title,
            content: report.content,
            report_type: report.report_type,
            generated_at: report.generated_at,
        }
    }
}

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<ReportResponse>>, AppError> {
    let filter = ReportFilter {
        search: query.term(),
        project_id: parse_filter(query.project_id.as_deref(), "projectId")?,
        report_type: parse_filter(query.report_type.as_deref(), "type")?,
    };
    let pagination = query.pagination();

    let (reports, total) = ReportRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    let items = reports.into_iter().map(ReportResponse::from).collect();
    Ok(Json(Listing::new(items, pagination, total)))
}

#[instrument(skip_all, fields(report_id = %id))]
pub async fn detail(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ReportId>,
) -> Result<Json<ReportResponse>, AppError> {
    let report = ReportRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("report not found".to_owned()))?;
    Ok(Json(report.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportPayload {
    pub project_id: ProjectId,
    pub title: String,
    pub content: String,
    #[serde(default, rename = "type")]
    pub report_type: Option<ReportType>,
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CreateReportPayload>,
) -> Result<(StatusCode, Json<ReportResponse>), AppError> {
    let title = sanitize_text(&payload.title);
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_owned()));
    }

    let report = ReportRepository::new(state.pool())
        .create(&NewReport {
            project_id: payload.project_id,
            title,
            content: sanitize_html(&payload.content),
            report_type: payload.report_type.unwrap_or_default(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(report.into())))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportPayload {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[instrument(skip_all, fields(report_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ReportId>,
    Json(payload): Json<UpdateReportPayload>,
) -> Result<Json<ReportResponse>, AppError> {
    let report = ReportRepository::new(state.pool())
        .update(
            id,
            &ReportUpdate {
                title: payload.title.as_deref().map(sanitize_text),
                content: payload.content.as_deref().map(sanitize_html),
            },
        )
        .await?;
    Ok(Json(report.into()))
}

#[instrument(skip_all, fields(report_id = %id))]
pub async fn remove(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ReportId>,
) -> Result<StatusCode, AppError> {
    ReportRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
