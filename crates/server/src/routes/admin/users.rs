//! Admin user directory, dual-homed with the identity provider.
//!
//! Writes follow a compensated sequence instead of a distributed
//! transaction:
//!
//! - create: provider account first, then the db row; if the row insert
//!   fails the provider account is deleted again (logged if that also
//!   fails).
//! - update: db row first; a provider sync failure is logged, not fatal.
//! - delete: self-deletion is rejected up front; the provider delete
//!   tolerates an already-absent account, and the db row is removed
//!   regardless since the database is the record of truth.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumeo_core::{Email, UserId, UserRole};

use crate::db::UserRepository;
use crate::db::users::UserFilter;
use crate::error::AppError;
use crate::listing::{ListQuery, Listing};
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::sanitize::sanitize_text;
use crate::state::AppState;

use super::parse_filter;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<UserResponse>>, AppError> {
    let filter = UserFilter {
        search: query.term(),
        role: parse_filter(query.role.as_deref(), "role")?,
    };
    let pagination = query.pagination();

    let (users, total) = UserRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    let items = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Listing::new(items, pagination, total)))
}

#[instrument(skip_all, fields(user_id = %id))]
pub async fn detail(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let name = sanitize_text(&payload.name);
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }
    let email = payload
        .email
        .parse::<Email>()
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
    if payload.password.len() < 8 {
        return Err(AppError::BadRequest(
            "password must be at least 8 characters".to_owned(),
        ));
    }
    let role = payload.role.unwrap_or_default();
    let password = SecretString::from(payload.password);

    // Provider first, so the shared account ID exists before the row does.
    let id = state
        .identity()
        .create_account(email.as_str(), &password, &name, role)
        .await?;

    let created = UserRepository::new(state.pool())
        .create(id, &email, &name, role)
        .await;

    match created {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "user created");
            Ok((StatusCode::CREATED, Json(user.into())))
        }
        Err(db_err) => {
            // Compensate: the row failed, so the provider account must go.
            if let Err(cleanup_err) = state.identity().delete_account(id).await {
                tracing::error!(
                    user_id = %id,
                    error = %cleanup_err,
                    "failed to roll back identity account after db error"
                );
            }
            Err(db_err.into())
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
}

#[instrument(skip_all, fields(user_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<UserResponse>, AppError> {
    let email = payload
        .email
        .map(|e| {
            e.parse::<Email>()
                .map_err(|err| AppError::BadRequest(format!("invalid email: {err}")))
        })
        .transpose()?;
    let name = payload.name.as_deref().map(sanitize_text);

    let user = UserRepository::new(state.pool())
        .update(
            id,
            &crate::db::users::UserUpdate {
                email: email.clone(),
                name: name.clone(),
                role: payload.role,
            },
        )
        .await?;

    // Database is the record of truth; provider sync failure is non-fatal.
    if let Err(sync_err) = state
        .identity()
        .update_account(
            id,
            email.as_ref().map(Email::as_str),
            name.as_deref(),
            payload.role,
        )
        .await
    {
        tracing::warn!(
            user_id = %id,
            error = %sync_err,
            "identity provider sync failed after user update"
        );
    }

    Ok(Json(user.into()))
}

#[instrument(skip_all, fields(user_id = %id))]
pub async fn remove(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusCode, AppError> {
    // Reject before any mutation; an admin cannot delete their own account.
    if current.id == id {
        return Err(AppError::BadRequest(
            "cannot delete your own account".to_owned(),
        ));
    }

    let repo = UserRepository::new(state.pool());
    // 404 before touching the provider
    repo.get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    // Tolerates an already-absent provider account; other provider errors
    // are logged and the row is deleted anyway.
    if let Err(provider_err) = state.identity().delete_account(id).await {
        tracing::warn!(
            user_id = %id,
            error = %provider_err,
            "identity provider delete failed; removing db row regardless"
        );
    }

    repo.delete(id).await?;
    tracing::info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
