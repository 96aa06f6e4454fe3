//! Application settings: a flat key/value store of TEXT values.

use sqlx::PgPool;

use super::RepositoryError;

/// Setting key for the inbound business email address.
pub const BUSINESS_EMAIL: &str = "business_email";

/// Fetch a setting value, `None` if the key has never been set.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get(pool: &PgPool, key: &str) -> Result<Option<String>, RepositoryError> {
    let value: Option<String> =
        sqlx::query_scalar("SELECT value FROM app_settings WHERE key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await?;
    Ok(value)
}

/// Fetch all settings as key/value pairs.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_all(pool: &PgPool) -> Result<Vec<(String, String)>, RepositoryError> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT key, value FROM app_settings ORDER BY key")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

/// Insert or overwrite a setting.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the upsert fails.
pub async fn set(pool: &PgPool, key: &str, value: &str) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO app_settings (key, value) VALUES ($1, $2) \
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// The configured business email, falling back to the given default when the
/// setting is absent.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn business_email(pool: &PgPool, fallback: &str) -> Result<String, RepositoryError> {
    Ok(get(pool, BUSINESS_EMAIL)
        .await?
        .unwrap_or_else(|| fallback.to_owned()))
}
