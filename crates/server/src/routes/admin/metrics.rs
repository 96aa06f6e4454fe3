//! Admin website metrics: snapshot ingestion and aggregate summary.

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

use lumeo_core::{MetricsId, ProjectId};

use crate::db::MetricsRepository;
use crate::db::metrics::{MetricsFilter, MetricsSummary, NewMetrics};
use crate::error::AppError;
use crate::listing::{ListQuery, Listing};
use crate::middleware::RequireAuth;
use crate::models::WebsiteMetrics;
use crate::state::AppState;

use super::{parse_date_filter, parse_filter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub id: MetricsId,
    pub project_id: Option<ProjectId>,
    pub uptime: Option<f64>,
    pub response_time: Option<f64>,
    pub page_speed: i32,
    pub seo_score: i32,
    pub traffic_count: i64,
    pub conversion_rate: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl From<WebsiteMetrics> for MetricsResponse {
    fn from(metrics: WebsiteMetrics) -> Self {
        Self {
            id: metrics.id,
            project_id: metrics.project_id,
            uptime: metrics.uptime.to_f64(),
            response_time: metrics.response_time.to_f64(),
            page_speed: metrics.page_speed,
            seo_score: metrics.seo_score,
            traffic_count: metrics.traffic_count,
            conversion_rate: metrics.conversion_rate.to_f64(),
            recorded_at: metrics.recorded_at,
        }
    }
}

fn filter_from_query(query: &ListQuery) -> Result<MetricsFilter, AppError> {
    Ok(MetricsFilter {
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
) -> Result<Json<Listing<MetricsResponse>>, AppError> {
    let filter = filter_from_query(&query)?;
    let pagination = query.pagination();

    let (snapshots, total) = MetricsRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    let items = snapshots.into_iter().map(MetricsResponse::from).collect();
    Ok(Json(Listing::new(items, pagination, total)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMetricsPayload {
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    pub uptime: Decimal,
    pub response_time: Decimal,
    pub page_speed: i32,
    pub seo_score: i32,
    pub traffic_count: i64,
    pub conversion_rate: Decimal,
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CreateMetricsPayload>,
) -> Result<(StatusCode, Json<MetricsResponse>), AppError> {
    let snapshot = MetricsRepository::new(state.pool())
        .create(&NewMetrics {
            project_id: payload.project_id,
            uptime: payload.uptime,
            response_time: payload.response_time,
            page_speed: payload.page_speed,
            seo_score: payload.seo_score,
            traffic_count: payload.traffic_count,
            conversion_rate: payload.conversion_rate,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(snapshot.into())))
}

/// Aggregate averages over the matching snapshots. All fields are null when
/// nothing matched.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummaryResponse {
    pub avg_uptime: Option<f64>,
    pub avg_response_time: Option<f64>,
    pub avg_page_speed: Option<f64>,
    pub avg_seo_score: Option<f64>,
    pub total_traffic: Option<i64>,
    pub avg_conversion_rate: Option<f64>,
}

impl From<MetricsSummary> for MetricsSummaryResponse {
    fn from(summary: MetricsSummary) -> Self {
        Self {
            avg_uptime: summary.avg_uptime.and_then(|d| d.to_f64()),
            avg_response_time: summary.avg_response_time.and_then(|d| d.to_f64()),
            avg_page_speed: summary.avg_page_speed.and_then(|d| d.to_f64()),
            avg_seo_score: summary.avg_seo_score.and_then(|d| d.to_f64()),
            total_traffic: summary.total_traffic,
            avg_conversion_rate: summary.avg_conversion_rate.and_then(|d| d.to_f64()),
        }
    }
}

#[instrument(skip_all)]
pub async fn summary(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MetricsSummaryResponse>, AppError> {
    let filter = filter_from_query(&query)?;

    let summary = MetricsRepository::new(state.pool()).summary(&filter).await?;
    Ok(Json(summary.into()))
}
