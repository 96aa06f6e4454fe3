//! Integration tests for blog publishing.
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

use lumeo_integration_tests::{anonymous_client, authenticated_client, base_url};

#[tokio::test]
#[ignore = "Requires running server and admin credentials"]
async fn test_admin_routes_require_session() {
    let client = anonymous_client();

    let resp = client
        .get(format!("{}/api/admin/blog", base_url()))
        .send()
        .await
        .expect("Failed to request admin blog list");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

/// Publishing round trip: a draft has no `publishedAt`, publishing sets it,
/// the post appears on the public blog, and unpublishing clears it again.
#[tokio::test]
#[ignore = "Requires running server and admin credentials"]
async fn test_blog_publish_round_trip() {
    let client = authenticated_client().await;
    let base = base_url();
    let slug = format!("round-trip-{}", Uuid::new_v4());

    // Create a draft.
    let resp = client
        .post(format!("{base}/api/admin/blog"))
        .json(&json!({
            "title": "Round Trip",
            "slug": slug,
            "content": "<p>Body</p>",
        }))
        .send()
        .await
        .expect("Failed to create draft");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Value = resp.json().await.expect("Failed to read draft");
    let id = post["id"].as_str().expect("draft id").to_owned();
    assert_eq!(post["published"], json!(false));
    assert!(post["publishedAt"].is_null());

    // The draft must not leak onto the public blog.
    let resp = anonymous_client()
        .get(format!("{base}/api/blog/{slug}"))
        .send()
        .await
        .expect("Failed to fetch public post");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Publish.
    let resp = client
        .put(format!("{base}/api/admin/blog/{id}"))
        .json(&json!({ "published": true }))
        .send()
        .await
        .expect("Failed to publish");
    assert_eq!(resp.status(), StatusCode::OK);
    let post: Value = resp.json().await.expect("Failed to read published post");
    assert_eq!(post["published"], json!(true));
    assert!(
        post["publishedAt"].is_string(),
        "publishing must stamp publishedAt"
    );

    // Now visible publicly.
    let resp = anonymous_client()
        .get(format!("{base}/api/blog/{slug}"))
        .send()
        .await
        .expect("Failed to fetch public post");
    assert_eq!(resp.status(), StatusCode::OK);

    // Unpublish clears the timestamp.
    let resp = client
        .put(format!("{base}/api/admin/blog/{id}"))
        .json(&json!({ "published": false }))
        .send()
        .await
        .expect("Failed to unpublish");
    assert_eq!(resp.status(), StatusCode::OK);
    let post: Value = resp.json().await.expect("Failed to read unpublished post");
    assert_eq!(post["published"], json!(false));
    assert!(post["publishedAt"].is_null());

    // Cleanup.
    let resp = client
        .delete(format!("{base}/api/admin/blog/{id}"))
        .send()
        .await
        .expect("Failed to delete post");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running server and admin credentials"]
async fn test_blog_update_rejects_empty_title() {
    let client = authenticated_client().await;
    let base = base_url();
    let slug = format!("empty-title-{}", Uuid::new_v4());

    let resp = client
        .post(format!("{base}/api/admin/blog"))
        .json(&json!({
            "title": "Keep Me",
            "slug": slug,
            "content": "<p>Body</p>",
        }))
        .send()
        .await
        .expect("Failed to create post");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Value = resp.json().await.expect("Failed to read post");
    let id = post["id"].as_str().expect("post id").to_owned();

    // Blanking the title is rejected the same way create rejects it.
    let resp = client
        .put(format!("{base}/api/admin/blog/{id}"))
        .json(&json!({ "title": "" }))
        .send()
        .await
        .expect("Failed to update post");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(format!("{base}/api/admin/blog/{id}"))
        .send()
        .await
        .expect("Failed to fetch post");
    let post: Value = resp.json().await.expect("Failed to read post");
    assert_eq!(post["title"], json!("Keep Me"));

    let _ = client
        .delete(format!("{base}/api/admin/blog/{id}"))
        .send()
        .await;
}

#[tokio::test]
#[ignore = "Requires running server and admin credentials"]
async fn test_blog_rejects_duplicate_slug() {
    let client = authenticated_client().await;
    let base = base_url();
    let slug = format!("duplicate-{}", Uuid::new_v4());

    let payload = json!({
        "title": "First",
        "slug": slug,
        "content": "<p>Body</p>",
    });

    let resp = client
        .post(format!("{base}/api/admin/blog"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to create post");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Value = resp.json().await.expect("Failed to read post");
    let id = post["id"].as_str().expect("post id").to_owned();

    let resp = client
        .post(format!("{base}/api/admin/blog"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to create duplicate");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let _ = client
        .delete(format!("{base}/api/admin/blog/{id}"))
        .send()
        .await;
}
