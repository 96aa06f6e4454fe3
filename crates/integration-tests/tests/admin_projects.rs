//! Integration tests for admin project and contact management.
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
async fn test_missing_project_is_404() {
    let client = authenticated_client().await;

    let resp = client
        .get(format!("{}/api/admin/projects/{}", base_url(), Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to request project");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and admin credentials"]
async fn test_project_lifecycle() {
    let client = authenticated_client().await;
    let base = base_url();

    // Projects hang off a contact; create one first.
    let resp = client
        .post(format!("{base}/api/admin/contacts"))
        .json(&json!({
            "name": "Lifecycle Client",
            "email": format!("lifecycle-{}@example.com", Uuid::new_v4()),
        }))
        .send()
        .await
        .expect("Failed to create contact");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let contact: Value = resp.json().await.expect("Failed to read contact");
    let contact_id = contact["id"].as_str().expect("contact id").to_owned();

    let resp = client
        .post(format!("{base}/api/admin/projects"))
        .json(&json!({
            "name": "Lifecycle Site",
            "contactId": contact_id,
            "budget": 12500.50,
        }))
        .send()
        .await
        .expect("Failed to create project");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let project: Value = resp.json().await.expect("Failed to read project");
    let project_id = project["id"].as_str().expect("project id").to_owned();
    assert_eq!(project["status"], json!("PLANNING"));

    // Move it along.
    let resp = client
        .put(format!("{base}/api/admin/projects/{project_id}"))
        .json(&json!({ "status": "IN_PROGRESS" }))
        .send()
        .await
        .expect("Failed to update project");
    assert_eq!(resp.status(), StatusCode::OK);
    let project: Value = resp.json().await.expect("Failed to read project");
    assert_eq!(project["status"], json!("IN_PROGRESS"));

    // Listing carries the contact name and open task count.
    let resp = client
        .get(format!("{base}/api/admin/projects?search=Lifecycle Site"))
        .send()
        .await
        .expect("Failed to list projects");
    assert_eq!(resp.status(), StatusCode::OK);
    let listing: Value = resp.json().await.expect("Failed to read listing");
    let found = listing["items"]
        .as_array()
        .expect("items array")
        .iter()
        .any(|p| p["id"] == json!(project_id) && p["contactName"] == json!("Lifecycle Client"));
    assert!(found, "created project should appear in the listing");

    // Delete cascades to tasks.
    let resp = client
        .delete(format!("{base}/api/admin/projects/{project_id}"))
        .send()
        .await
        .expect("Failed to delete project");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running server and admin credentials"]
async fn test_project_with_unknown_contact_is_400() {
    let client = authenticated_client().await;

    let resp = client
        .post(format!("{}/api/admin/projects", base_url()))
        .json(&json!({
            "name": "Orphan Site",
            "contactId": Uuid::new_v4(),
        }))
        .send()
        .await
        .expect("Failed to create project");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and admin credentials"]
async fn test_garbage_status_filter_is_400() {
    let client = authenticated_client().await;

    let resp = client
        .get(format!("{}/api/admin/projects?status=bogus", base_url()))
        .send()
        .await
        .expect("Failed to list projects");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and admin credentials"]
async fn test_dashboard_shape() {
    let client = authenticated_client().await;

    let resp = client
        .get(format!("{}/api/admin/dashboard", base_url()))
        .send()
        .await
        .expect("Failed to fetch dashboard");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to read dashboard");
    assert!(body["totalContacts"].is_i64());
    assert!(body["conversionRate"].is_i64());
    assert!(body["contactsByStatus"].is_object());
}
