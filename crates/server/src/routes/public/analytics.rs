//! Public analytics ingestion.
//!
//! Payloads are validated before hitting the store: an event with a blank
//! name is rejected with 400 rather than persisted.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::db::AnalyticsRepository;
use crate::db::analytics::NewAnalyticsEvent;
use crate::error::AppError;
use crate::state::AppState;

use crate::sanitize::sanitize_optional_text;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPayload {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub properties: Option<Value>,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Ingest one analytics event.
#[instrument(skip_all)]
pub async fn ingest(
    State(state): State<AppState>,
    Json(payload): Json<AnalyticsPayload>,
) -> Result<StatusCode, AppError> {
    let event = payload
        .event
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("event name is required".to_owned()))?
        .to_owned();

    AnalyticsRepository::new(state.pool())
        .insert(&NewAnalyticsEvent {
            event,
            page: sanitize_optional_text(payload.page.as_deref()),
            referrer: sanitize_optional_text(payload.referrer.as_deref()),
            properties: payload.properties.unwrap_or(Value::Null),
            occurred_at: payload.occurred_at,
        })
        .await?;

    Ok(StatusCode::ACCEPTED)
}
