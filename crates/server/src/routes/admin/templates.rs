//! Admin email template management.
//!
//! Templates are stored only; no mail is sent from here. Variables are
//! re-extracted from `{{placeholder}}` markers on every write.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumeo_core::TemplateId;

use crate::db::TemplateRepository;
use crate::db::templates::{NewTemplate, TemplateFilter, TemplateUpdate};
use crate::error::AppError;
use crate::listing::{ListQuery, Listing, Pagination, capped_template_limit, equality_filter};
use crate::middleware::RequireAuth;
use crate::models::EmailTemplate;
use crate::sanitize::{sanitize_html, sanitize_optional_text, sanitize_text};
use crate::state::AppState;

use super::{deserialize_some, parse_filter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: TemplateId,
    pub name: String,
    pub subject: String,
    pub content: String,
    pub category: Option<String>,
    pub variables: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EmailTemplate> for TemplateResponse {
    fn from(template: EmailTemplate) -> Self {
        Self {
            id: template.id,
            name: template.name,
            subject: template.subject,
            content: template.content,
            category: template.category,
            variables: template.variables,
            active: template.active,
            created_at: template.created_at,
            updated_at: template.updated_at,
        }
    }
}

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<TemplateResponse>>, AppError> {
    let filter = TemplateFilter {
        search: query.term(),
        category: equality_filter(query.category.as_deref()),
        active: parse_filter(query.active.as_deref(), "active")?,
    };
    // The template picker loads big pages; the limit is client-set but
    // capped at 100.
    let pagination = Pagination::from_query(
        query.page.as_deref(),
        capped_template_limit(query.limit.as_deref()),
    );

    let (templates, total) = TemplateRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    let items = templates.into_iter().map(TemplateResponse::from).collect();
    Ok(Json(Listing::new(items, pagination, total)))
}

#[instrument(skip_all, fields(template_id = %id))]
pub async fn detail(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = TemplateRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("template not found".to_owned()))?;
    Ok(Json(template.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplatePayload {
    pub name: String,
    pub subject: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CreateTemplatePayload>,
) -> Result<(StatusCode, Json<TemplateResponse>), AppError> {
    let name = sanitize_text(&payload.name);
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }

    let template = TemplateRepository::new(state.pool())
        .create(&NewTemplate {
            name,
            subject: sanitize_text(&payload.subject),
            content: sanitize_html(&payload.content),
            category: sanitize_optional_text(payload.category.as_deref()),
            active: payload.active,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(template.into())))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplatePayload {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category: Option<Option<String>>,
    pub active: Option<bool>,
}

#[instrument(skip_all, fields(template_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
    Json(payload): Json<UpdateTemplatePayload>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = TemplateRepository::new(state.pool())
        .update(
            id,
            &TemplateUpdate {
                name: payload.name.as_deref().map(sanitize_text),
                subject: payload.subject.as_deref().map(sanitize_text),
                content: payload.content.as_deref().map(sanitize_html),
                category: payload
                    .category
                    .map(|c| sanitize_optional_text(c.as_deref())),
                active: payload.active,
            },
        )
        .await?;
    Ok(Json(template.into()))
}

#[instrument(skip_all, fields(template_id = %id))]
pub async fn remove(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
) -> Result<StatusCode, AppError> {
    TemplateRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
