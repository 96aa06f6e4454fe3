//! Integration tests for Lumeo.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p lumeo-cli -- migrate
//!
//! # Start the server
//! cargo run -p lumeo-server
//!
//! # Run the (ignored-by-default) integration tests
//! cargo test -p lumeo-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `LUMEO_BASE_URL` - Server base URL (default: <http://localhost:3000>)
//! - `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD` - Credentials of an existing
//!   admin-panel user, used by tests that hit `/api/admin`

use reqwest::Client;
use serde_json::json;

/// Base URL of the running server.
#[must_use]
pub fn base_url() -> String {
    std::env::var("LUMEO_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// A cookie-holding client with no session.
///
/// # Panics
///
/// Panics if the client cannot be built; tests have no way to continue.
#[must_use]
pub fn anonymous_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Log in with the test admin credentials and return a session-carrying
/// client.
///
/// # Panics
///
/// Panics if the credentials are missing from the environment or the login
/// request fails; the test suite cannot proceed without a session.
pub async fn authenticated_client() -> Client {
    let client = anonymous_client();
    let email = std::env::var("TEST_ADMIN_EMAIL").expect("TEST_ADMIN_EMAIL not set");
    let password = std::env::var("TEST_ADMIN_PASSWORD").expect("TEST_ADMIN_PASSWORD not set");

    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Login request failed");
    assert!(
        resp.status().is_success(),
        "Login failed with status {}",
        resp.status()
    );

    client
}
