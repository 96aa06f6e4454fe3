//! Integration tests for SEO/metrics tracking endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p lumeo-server)
//! - `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD` for an existing admin user
//!
//! Run with: cargo test -p lumeo-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use lumeo_integration_tests::{authenticated_client, base_url};

#[tokio::test]
#[ignore = "Requires running server and admin credentials"]
async fn test_metrics_summary_totals_traffic() {
    let client = authenticated_client().await;
    let base = base_url();

    let resp = client
        .post(format!("{base}/api/admin/metrics"))
        .json(&json!({
            "uptime": "99.95",
            "responseTime": "120.5",
            "pageSpeed": 88,
            "seoScore": 91,
            "trafficCount": 4321,
            "conversionRate": "2.4",
        }))
        .send()
        .await
        .expect("Failed to record metrics");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .get(format!("{base}/api/admin/metrics/summary"))
        .send()
        .await
        .expect("Failed to fetch summary");
    assert_eq!(resp.status(), StatusCode::OK);

    let summary: Value = resp.json().await.expect("Failed to read summary");
    let total = summary["totalTraffic"].as_i64().expect("totalTraffic");
    assert!(total >= 4321, "summary must include the new snapshot");
    assert!(summary["avgUptime"].is_f64());
}

#[tokio::test]
#[ignore = "Requires running server and admin credentials"]
async fn test_trends_without_bounds_returns_recent_series() {
    let client = authenticated_client().await;
    let base = base_url();

    // Rankings hang off a project, which hangs off a contact.
    let resp = client
        .post(format!("{base}/api/admin/contacts"))
        .json(&json!({
            "name": "Trend Client",
            "email": format!("trend-{}@example.com", Uuid::new_v4()),
        }))
        .send()
        .await
        .expect("Failed to create contact");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let contact: Value = resp.json().await.expect("Failed to read contact");

    let resp = client
        .post(format!("{base}/api/admin/projects"))
        .json(&json!({
            "name": "Trend Site",
            "contactId": contact["id"],
        }))
        .send()
        .await
        .expect("Failed to create project");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let project: Value = resp.json().await.expect("Failed to read project");
    let project_id = project["id"].as_str().expect("project id").to_owned();

    let keyword = format!("trend-keyword-{}", Uuid::new_v4());
    let resp = client
        .post(format!("{base}/api/admin/rankings"))
        .json(&json!({
            "projectId": project_id,
            "keyword": keyword,
            "url": "https://example.com",
            "position": 7,
        }))
        .send()
        .await
        .expect("Failed to record ranking");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // No date bounds: a fresh measurement still falls inside the default
    // window, so its series shows up.
    let resp = client
        .get(format!(
            "{base}/api/admin/rankings/trends?projectId={project_id}"
        ))
        .send()
        .await
        .expect("Failed to fetch trends");
    assert_eq!(resp.status(), StatusCode::OK);

    let series: Value = resp.json().await.expect("Failed to read trends");
    let found = series
        .as_array()
        .expect("series array")
        .iter()
        .any(|s| s["keyword"] == json!(keyword) && s["points"].as_array().is_some_and(|p| !p.is_empty()));
    assert!(found, "new measurement should appear in a trend series");

    let _ = client
        .delete(format!("{base}/api/admin/projects/{project_id}"))
        .send()
        .await;
}
