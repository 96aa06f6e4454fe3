//! Public contact-form intake.

use axum::http::HeaderMap;
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use lumeo_core::Email;

use crate::db::ContactRepository;
use crate::db::contacts::NewContact;
use crate::db::settings;
use crate::error::AppError;
use crate::sanitize::sanitize_text;

use crate::sanitize::sanitize_optional_text;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Handle a contact-form submission.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    super::enforce_intake_limit(&state, &headers, "contact").await?;

    let name = sanitize_text(&form.name);
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }
    let email = form
        .email
        .parse::<Email>()
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let contact = ContactRepository::new(state.pool())
        .create(&NewContact {
            name,
            email,
            company: sanitize_optional_text(form.company.as_deref()),
            industry: sanitize_optional_text(form.industry.as_deref()),
            message: sanitize_optional_text(form.message.as_deref()),
        })
        .await?;

    tracing::info!(contact_id = %contact.id, "contact intake accepted");
    Ok((StatusCode::CREATED, Json(json!({ "id": contact.id }))))
}

/// The business contact email shown on the marketing pages.
///
/// Reads the `business_email` setting, falling back to the configured
/// default when no override has been stored.
#[instrument(skip_all)]
pub async fn info(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let email =
        settings::business_email(state.pool(), &state.config().contact_fallback_email).await?;
    Ok(Json(json!({ "email": email })))
}
