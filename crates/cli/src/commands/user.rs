//! Admin-panel user management commands.
//!
//! Users are dual-homed: credentials live in the external identity
//! provider, the directory row lives in our `users` table with the same
//! id. This command performs both writes, provider first.
//!
//! # Usage
//!
//! ```bash
//! lumeo-cli user create -e editor@lumeo.studio -n "Jane Editor" -p <password> -r editor
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `IDENTITY_URL` - Base URL of the identity provider
//! - `IDENTITY_SERVICE_KEY` - Service-role key for account operations

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use lumeo_core::{Email, UserRole};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Identity provider request failed.
    #[error("Identity provider error: {0}")]
    Identity(String),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: user, admin, editor")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too short.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),
}

#[derive(Serialize)]
struct CreateAccountRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
    role: &'a str,
}

#[derive(Deserialize)]
struct AccountCreated {
    id: Uuid,
}

/// Create a new admin-panel user.
///
/// Creates the identity-provider account first, then the directory row.
/// If the directory insert fails the provider account is deleted again so
/// the two stores stay in sync.
///
/// # Errors
///
/// Returns `UserError` if validation, either write, or the compensating
/// delete fails.
pub async fn create(email: &str, name: &str, password: &str, role: &str) -> Result<Uuid, UserError> {
    dotenvy::dotenv().ok();

    let role: UserRole = role
        .to_uppercase()
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;

    let email = Email::parse(email).map_err(|_| UserError::InvalidEmail(email.to_owned()))?;

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserError::WeakPassword);
    }
    let password = SecretString::from(password.to_owned());

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| UserError::MissingEnvVar("DATABASE_URL"))?;
    let identity_url =
        std::env::var("IDENTITY_URL").map_err(|_| UserError::MissingEnvVar("IDENTITY_URL"))?;
    let service_key = std::env::var("IDENTITY_SERVICE_KEY")
        .map_err(|_| UserError::MissingEnvVar("IDENTITY_SERVICE_KEY"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    // Check if user already exists
    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(UserError::UserExists(email.as_str().to_owned()));
    }

    tracing::info!("Creating identity-provider account: {} ({})", email, role);

    let client = reqwest::Client::new();
    let base = identity_url.trim_end_matches('/');
    let response = client
        .post(format!("{base}/v1/accounts"))
        .bearer_auth(&service_key)
        .json(&CreateAccountRequest {
            email: email.as_str(),
            password: password.expose_secret(),
            name,
            role: role.as_str(),
        })
        .send()
        .await
        .map_err(|e| UserError::Identity(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(UserError::Identity(format!("{status}: {body}")));
    }

    let account: AccountCreated = response
        .json()
        .await
        .map_err(|e| UserError::Identity(e.to_string()))?;

    let inserted = sqlx::query(
        "INSERT INTO users (id, email, name, role) VALUES ($1, $2, $3, $4)",
    )
    .bind(account.id)
    .bind(email.as_str())
    .bind(name)
    .bind(role.as_str())
    .execute(&pool)
    .await;

    if let Err(e) = inserted {
        // Roll back the provider account so the two stores stay in sync.
        tracing::error!("Directory insert failed, deleting provider account: {e}");
        let _ = client
            .delete(format!("{base}/v1/accounts/{}", account.id))
            .bearer_auth(&service_key)
            .send()
            .await;
        return Err(e.into());
    }

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        account.id,
        email,
        role
    );

    Ok(account.id)
}
