//! Session login and logout.
//!
//! Credentials are never checked locally. The identity provider verifies
//! them and the matching `users` row becomes the session's `CurrentUser`.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use lumeo_core::Email;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::IdentityError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[instrument(skip_all, fields(email = %payload.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let password = SecretString::from(payload.password);

    let account = state
        .identity()
        .verify_credentials(&payload.email, &password)
        .await
        .map_err(|e| match e {
            IdentityError::Unauthorized | IdentityError::AccountNotFound => {
                AppError::Unauthorized("invalid email or password".to_owned())
            }
            other => AppError::Identity(other),
        })?;

    let email: Email = account
        .email
        .parse()
        .map_err(|e| {
            AppError::Identity(IdentityError::Parse(format!(
                "provider returned malformed email: {e}"
            )))
        })?;

    // The directory row is the record of truth; a verified account without
    // one cannot log in.
    let repo = UserRepository::new(state.pool());
    let user = repo
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_owned()))?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    repo.touch_last_login(user.id).await?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(json!({ "user": current })))
}

#[instrument(skip_all)]
async fn logout(session: Session) -> Result<Json<Value>, AppError> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    Ok(Json(json!({ "ok": true })))
}

async fn me(RequireAuth(user): RequireAuth) -> Json<Value> {
    Json(json!({ "user": user }))
}
