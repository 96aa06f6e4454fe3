//! Session-gated admin JSON API, mounted under `/api/admin`.

pub mod blog;
pub mod contacts;
pub mod dashboard;
pub mod metrics;
pub mod projects;
pub mod rankings;
pub mod reports;
pub mod revenues;
pub mod settings;
pub mod tasks;
pub mod templates;
pub mod users;

use std::str::FromStr;

use axum::{
    Router,
    routing::{get, put},
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::AppError;
use crate::listing::equality_filter;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::overview))
        .route("/contacts", get(contacts::list).post(contacts::create))
        .route("/contacts/{id}", get(contacts::detail).put(contacts::update))
        .route("/projects", get(projects::list).post(projects::create))
        .route(
            "/projects/{id}",
            get(projects::detail)
                .put(projects::update)
                .delete(projects::remove),
        )
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/tasks/{id}",
            get(tasks::detail).put(tasks::update).delete(tasks::remove),
        )
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::detail).put(users::update).delete(users::remove),
        )
        .route("/blog", get(blog::list).post(blog::create))
        .route(
            "/blog/{id}",
            get(blog::detail).put(blog::update).delete(blog::remove),
        )
        .route("/rankings", get(rankings::list).post(rankings::create))
        .route("/rankings/trends", get(rankings::trends))
        .route("/metrics", get(metrics::list).post(metrics::create))
        .route("/metrics/summary", get(metrics::summary))
        .route("/reports", get(reports::list).post(reports::create))
        .route(
            "/reports/{id}",
            get(reports::detail)
                .put(reports::update)
                .delete(reports::remove),
        )
        .route("/revenues", get(revenues::list).post(revenues::create))
        .route("/revenues/total", get(revenues::total))
        .route("/templates", get(templates::list).post(templates::create))
        .route(
            "/templates/{id}",
            get(templates::detail)
                .put(templates::update)
                .delete(templates::remove),
        )
        .route("/settings", put(settings::update).get(settings::list))
}

/// Deserialize a present-but-possibly-null field into `Some(inner)`.
///
/// Pairs with `#[serde(default)]` on an `Option<Option<T>>` field so a
/// missing key means "leave unchanged" while an explicit `null` means
/// "clear the value".
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Parse an equality filter value into a typed filter, 400 on garbage.
///
/// Empty and `"all"` values mean "no filter" and yield `Ok(None)`.
pub(crate) fn parse_filter<T: FromStr>(
    raw: Option<&str>,
    name: &str,
) -> Result<Option<T>, AppError> {
    equality_filter(raw)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|_| AppError::BadRequest(format!("invalid {name} filter")))
        })
        .transpose()
}

/// Parse a date-range bound: RFC 3339, or a bare date taken at midnight UTC.
pub(crate) fn parse_date_filter(
    raw: Option<&str>,
    name: &str,
) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(value) = equality_filter(raw) else {
        return Ok(None);
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(&value) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }
    if let Ok(date) = value.parse::<NaiveDate>()
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(Some(midnight.and_utc()));
    }

    Err(AppError::BadRequest(format!("invalid {name} filter")))
}

#[cfg(test)]
mod tests {
    use lumeo_core::ContactStatus;

    use super::*;

    #[test]
    fn filter_skips_all_and_empty() {
        let parsed: Option<ContactStatus> = parse_filter(Some("all"), "status").unwrap();
        assert!(parsed.is_none());
        let parsed: Option<ContactStatus> = parse_filter(Some(""), "status").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn filter_rejects_unknown_values() {
        let parsed: Result<Option<ContactStatus>, _> = parse_filter(Some("BOGUS"), "status");
        assert!(parsed.is_err());
    }

    #[test]
    fn date_filter_accepts_bare_dates_and_rfc3339() {
        let from_date = parse_date_filter(Some("2025-06-01"), "from").unwrap().unwrap();
        assert_eq!(from_date.to_rfc3339(), "2025-06-01T00:00:00+00:00");

        let from_instant = parse_date_filter(Some("2025-06-01T10:30:00Z"), "from")
            .unwrap()
            .unwrap();
        assert_eq!(from_instant.to_rfc3339(), "2025-06-01T10:30:00+00:00");

        assert!(parse_date_filter(Some("junk"), "from").is_err());
    }
}
