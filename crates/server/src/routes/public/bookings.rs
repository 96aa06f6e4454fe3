//! Public booking intake.
//!
//! A booking is recorded as a new contact with the requested service and
//! preferred date folded into the message, so it lands in the same sales
//! pipeline as the contact form.

use axum::http::HeaderMap;
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use lumeo_core::Email;

use crate::db::ContactRepository;
use crate::db::contacts::NewContact;
use crate::error::AppError;
use crate::sanitize::sanitize_text;
use crate::state::AppState;

use crate::sanitize::sanitize_optional_text;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Fold the booking-specific fields and free-text message into the contact
/// message.
fn booking_message(
    service: Option<&str>,
    preferred_date: Option<&str>,
    message: Option<&str>,
) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(service) = service {
        parts.push(format!("Requested service: {service}"));
    }
    if let Some(date) = preferred_date {
        parts.push(format!("Preferred date: {date}"));
    }
    if let Some(message) = message {
        parts.push(message.to_owned());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Handle a booking submission.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<BookingForm>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    super::enforce_intake_limit(&state, &headers, "bookings").await?;

    let name = sanitize_text(&form.name);
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }
    let email = form
        .email
        .parse::<Email>()
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let service = sanitize_optional_text(form.service.as_deref());
    let preferred_date = sanitize_optional_text(form.preferred_date.as_deref());
    let message = sanitize_optional_text(form.message.as_deref());

    let contact = ContactRepository::new(state.pool())
        .create(&NewContact {
            name,
            email,
            company: sanitize_optional_text(form.company.as_deref()),
            industry: sanitize_optional_text(form.industry.as_deref()),
            message: booking_message(
                service.as_deref(),
                preferred_date.as_deref(),
                message.as_deref(),
            ),
        })
        .await?;

    tracing::info!(contact_id = %contact.id, "booking intake accepted");
    Ok((StatusCode::CREATED, Json(json!({ "id": contact.id }))))
}

#[cfg(test)]
mod tests {
    use super::booking_message;

    #[test]
    fn folds_all_parts_in_order() {
        let message = booking_message(Some("SEO audit"), Some("2025-07-01"), Some("Call me"));
        assert_eq!(
            message.as_deref(),
            Some("Requested service: SEO audit\nPreferred date: 2025-07-01\nCall me")
        );
    }

    #[test]
    fn empty_booking_has_no_message() {
        assert_eq!(booking_message(None, None, None), None);
    }
}
