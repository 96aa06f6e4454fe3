//! Admin application settings: a flat key/value surface.

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::settings;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::sanitize::sanitize_text;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: BTreeMap<String, String>,
}

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = settings::get_all(state.pool()).await?.into_iter().collect();
    Ok(Json(SettingsResponse { settings }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsPayload {
    pub settings: BTreeMap<String, String>,
}

/// Upsert every key in the payload. Keys absent from the payload are left
/// untouched; there is no way to delete a setting.
#[instrument(skip_all)]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettingsPayload>,
) -> Result<Json<SettingsResponse>, AppError> {
    for (key, value) in &payload.settings {
        let key = sanitize_text(key);
        if key.trim().is_empty() {
            return Err(AppError::BadRequest("setting key must not be empty".to_owned()));
        }
        settings::set(state.pool(), &key, &sanitize_text(value)).await?;
    }

    let settings = settings::get_all(state.pool()).await?.into_iter().collect();
    Ok(Json(SettingsResponse { settings }))
}
