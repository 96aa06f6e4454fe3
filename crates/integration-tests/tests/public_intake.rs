//! Integration tests for the public intake endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p lumeo-server)
//!
//! Run with: cargo test -p lumeo-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use lumeo_integration_tests::{anonymous_client, base_url};

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_contact_submission_creates_contact() {
    let client = anonymous_client();
    let email = format!("intake-{}@example.com", Uuid::new_v4());

    let resp = client
        .post(format!("{}/api/contact", base_url()))
        .json(&json!({
            "name": "Integration Test",
            "email": email,
            "company": "Test Co",
            "message": "Hello from the test suite",
        }))
        .send()
        .await
        .expect("Failed to submit contact form");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to read response");
    assert!(body.get("id").is_some(), "response should carry the new id");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_contact_submission_rejects_bad_email() {
    let client = anonymous_client();

    let resp = client
        .post(format!("{}/api/contact", base_url()))
        .json(&json!({
            "name": "Integration Test",
            "email": "not-an-email",
        }))
        .send()
        .await
        .expect("Failed to submit contact form");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_booking_submission_creates_contact() {
    let client = anonymous_client();
    let email = format!("booking-{}@example.com", Uuid::new_v4());

    let resp = client
        .post(format!("{}/api/bookings", base_url()))
        .json(&json!({
            "name": "Booking Test",
            "email": email,
            "service": "Website redesign",
            "preferredDate": "2026-09-15",
        }))
        .send()
        .await
        .expect("Failed to submit booking form");

    assert_eq!(resp.status(), StatusCode::CREATED);
}

/// The intake limiter admits 5 requests per client per minute; the sixth
/// within the window must be turned away with 429.
#[tokio::test]
#[ignore = "Requires running server"]
async fn test_intake_rate_limit_denies_sixth_request() {
    let client = anonymous_client();
    // A unique forwarded-for address keeps this test's window separate from
    // other test runs.
    let fake_ip = format!("203.0.113.{}", rand_octet());

    let mut last_status = StatusCode::OK;
    for _ in 0..6 {
        let email = format!("burst-{}@example.com", Uuid::new_v4());
        let resp = client
            .post(format!("{}/api/contact", base_url()))
            .header("x-forwarded-for", &fake_ip)
            .json(&json!({
                "name": "Burst Test",
                "email": email,
            }))
            .send()
            .await
            .expect("Failed to submit contact form");
        last_status = resp.status();
    }

    assert_eq!(last_status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_analytics_event_requires_name() {
    let client = anonymous_client();

    let resp = client
        .post(format!("{}/api/analytics/events", base_url()))
        .json(&json!({ "page": "/pricing" }))
        .send()
        .await
        .expect("Failed to post analytics event");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{}/api/analytics/events", base_url()))
        .json(&json!({ "event": "page_view", "page": "/pricing" }))
        .send()
        .await
        .expect("Failed to post analytics event");
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_feed_and_sitemap_serve_xml() {
    let client = anonymous_client();

    for path in ["/feed.xml", "/sitemap.xml"] {
        let resp = client
            .get(format!("{}{path}", base_url()))
            .send()
            .await
            .expect("Failed to fetch feed");

        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        assert!(content_type.contains("xml"), "got {content_type} for {path}");
    }
}

/// A low-tech unique octet so parallel runs rarely collide.
#[allow(clippy::cast_possible_truncation)]
fn rand_octet() -> u8 {
    (Uuid::new_v4().as_u128() % 200) as u8
}
