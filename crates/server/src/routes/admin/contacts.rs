//! Admin contact management: listing, status changes, assignment.
//!
//! Contacts have no delete endpoint; closed leads stay in the pipeline
//! history.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumeo_core::{ContactId, ContactStatus, Email, UserId};

use crate::db::ContactRepository;
use crate::db::contacts::{ContactFilter, ContactUpdate, NewContact};
use crate::error::AppError;
use crate::listing::{ListQuery, Listing};
use crate::middleware::RequireAuth;
use crate::models::Contact;
use crate::sanitize::{sanitize_optional_text, sanitize_text};
use crate::state::AppState;

use super::{deserialize_some, parse_filter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: ContactId,
    pub name: String,
    pub email: Email,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub message: Option<String>,
    pub status: ContactStatus,
    pub assigned_to: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name,
            email: contact.email,
            company: contact.company,
            industry: contact.industry,
            message: contact.message,
            status: contact.status,
            assigned_to: contact.assigned_to,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        }
    }
}

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<ContactResponse>>, AppError> {
    let filter = ContactFilter {
        search: query.term(),
        status: parse_filter(query.status.as_deref(), "status")?,
        assigned_to: parse_filter(query.assigned_to.as_deref(), "assignedTo")?,
    };
    let pagination = query.pagination();

    let (contacts, total) = ContactRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    let items = contacts.into_iter().map(ContactResponse::from).collect();
    Ok(Json(Listing::new(items, pagination, total)))
}

#[instrument(skip_all, fields(contact_id = %id))]
pub async fn detail(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
) -> Result<Json<ContactResponse>, AppError> {
    let contact = ContactRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("contact not found".to_owned()))?;
    Ok(Json(contact.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactPayload {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CreateContactPayload>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    let name = sanitize_text(&payload.name);
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }
    let email = payload
        .email
        .parse::<Email>()
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let contact = ContactRepository::new(state.pool())
        .create(&NewContact {
            name,
            email,
            company: sanitize_optional_text(payload.company.as_deref()),
            industry: sanitize_optional_text(payload.industry.as_deref()),
            message: sanitize_optional_text(payload.message.as_deref()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(contact.into())))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactPayload {
    pub name: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub status: Option<ContactStatus>,
    /// Present-null clears the assignment.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub assigned_to: Option<Option<UserId>>,
}

#[instrument(skip_all, fields(contact_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
    Json(payload): Json<UpdateContactPayload>,
) -> Result<Json<ContactResponse>, AppError> {
    let contact = ContactRepository::new(state.pool())
        .update(
            id,
            &ContactUpdate {
                name: payload.name.as_deref().map(sanitize_text),
                company: payload.company.as_deref().map(sanitize_text),
                industry: payload.industry.as_deref().map(sanitize_text),
                status: payload.status,
                assigned_to: payload.assigned_to,
            },
        )
        .await?;
    Ok(Json(contact.into()))
}
