//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (database ping)
//!
//! # Public surface (no session)
//! POST /api/contact                   - Contact-form intake (rate limited)
//! POST /api/bookings                  - Booking intake (rate limited)
//! POST /api/analytics/events          - Analytics ingestion
//! GET  /api/blog                      - Published posts
//! GET  /api/blog/{slug}               - Published post detail
//! GET  /feed.xml                      - RSS 2.0 feed of published posts
//! GET  /sitemap.xml                   - Static routes + published posts
//!
//! # Auth
//! POST /api/auth/login                - Password login via identity provider
//! POST /api/auth/logout               - Clear the session
//! GET  /api/auth/me                   - Current session user
//!
//! # Admin (session-gated JSON, under /api/admin)
//! GET  /dashboard                     - Aggregate business overview
//! GET|POST /contacts, GET|PUT /contacts/{id}
//! GET|POST /projects, GET|PUT|DELETE /projects/{id}
//! GET|POST /tasks, GET|PUT|DELETE /tasks/{id}
//! GET|POST /users, GET|PUT|DELETE /users/{id}
//! GET|POST /blog, GET|PUT|DELETE /blog/{id}
//! GET|POST /rankings, GET /rankings/trends
//! GET|POST /metrics, GET /metrics/summary
//! GET|POST /reports, GET|PUT|DELETE /reports/{id}
//! GET|POST /revenues, GET /revenues/total
//! GET|POST /templates, GET|PUT|DELETE /templates/{id}
//! GET|PUT /settings
//! ```

pub mod admin;
pub mod auth;
pub mod public;

use axum::Router;

use crate::state::AppState;

/// Assemble the full application router (health endpoints are mounted by
/// `main`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(public::routes())
        .merge(auth::routes())
        .nest("/api/admin", admin::routes())
}
