//! Admin revenue entries: append-only records plus a filtered total.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumeo_core::{ProjectId, RevenueId};

use crate::db::RevenueRepository;
use crate::db::revenues::{NewRevenue, RevenueFilter};
use crate::error::AppError;
use crate::listing::{ListQuery, Listing};
use crate::middleware::RequireAuth;
use crate::models::Revenue;
use crate::sanitize::sanitize_optional_text;
use crate::state::AppState;

use super::{parse_date_filter, parse_filter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueResponse {
    pub id: RevenueId,
    pub project_id: ProjectId,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<Revenue> for RevenueResponse {
    fn from(revenue: Revenue) -> Self {
        Self {
            id: revenue.id,
            project_id: revenue.project_id,
            amount: revenue.amount.to_f64(),
            description: revenue.description,
            recorded_at: revenue.recorded_at,
        }
    }
}

fn filter_from_query(query: &ListQuery) -> Result<RevenueFilter, AppError> {
    Ok(RevenueFilter {
        project_id: parse_filter(query.project_id.as_deref(), "projectId")?,
        date_from: parse_date_filter(query.date_from.as_deref(), "from")?,
        date_to: parse_date_filter(query.date_to.as_deref(), "to")?,
    })
}

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<RevenueResponse>>, AppError> {
    let filter = filter_from_query(&query)?;
    let pagination = query.pagination();

    let (revenues, total) = RevenueRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    let items = revenues.into_iter().map(RevenueResponse::from).collect();
    Ok(Json(Listing::new(items, pagination, total)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRevenuePayload {
    pub project_id: ProjectId,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CreateRevenuePayload>,
) -> Result<(StatusCode, Json<RevenueResponse>), AppError> {
    if payload.amount.is_sign_negative() {
        return Err(AppError::BadRequest(
            "amount must be non-negative".to_owned(),
        ));
    }

    let revenue = RevenueRepository::new(state.pool())
        .create(&NewRevenue {
            project_id: payload.project_id,
            amount: payload.amount,
            description: sanitize_optional_text(payload.description.as_deref()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(revenue.into())))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueTotalResponse {
    pub total: Option<f64>,
}

#[instrument(skip_all)]
pub async fn total(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<RevenueTotalResponse>, AppError> {
    let filter = filter_from_query(&query)?;

    let total = RevenueRepository::new(state.pool()).total(&filter).await?;
    Ok(Json(RevenueTotalResponse {
        total: total.to_f64(),
    }))
}
