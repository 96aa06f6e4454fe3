//! Public surface: intake forms, analytics ingestion, blog syndication.

pub mod analytics;
pub mod blog;
pub mod bookings;
pub mod contact;
pub mod feed;

use axum::http::HeaderMap;
use axum::{
    Router,
    routing::{get, post},
};

use crate::db::RateLimitRepository;
use crate::db::rate_limits::INTAKE_LIMIT;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/contact", post(contact::submit))
        .route("/api/contact-info", get(contact::info))
        .route("/api/bookings", post(bookings::submit))
        .route("/api/analytics/events", post(analytics::ingest))
        .route("/api/blog", get(blog::list))
        .route("/api/blog/{slug}", get(blog::detail))
        .route("/feed.xml", get(feed::rss))
        .route("/sitemap.xml", get(feed::sitemap))
}

/// Best-effort client key for rate limiting: the first hop of
/// `X-Forwarded-For`, then `X-Real-IP`, then a shared bucket.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map_or_else(|| "unknown".to_owned(), |ip| ip.trim().to_owned())
}

/// Enforce the intake rate limit for one scope, 429 on exhaustion.
async fn enforce_intake_limit(
    state: &AppState,
    headers: &HeaderMap,
    scope: &str,
) -> Result<(), AppError> {
    let key = client_key(headers);
    let decision = RateLimitRepository::new(state.pool())
        .hit(&key, scope, INTAKE_LIMIT)
        .await?;

    if decision.is_allowed() {
        Ok(())
    } else {
        tracing::warn!(%key, scope, "intake rate limit exceeded");
        Err(AppError::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};

    use super::client_key;

    #[test]
    fn prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_key(&headers), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_real_ip_then_shared_bucket() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_key(&headers), "10.0.0.2");

        assert_eq!(client_key(&HeaderMap::new()), "unknown");
    }
}
