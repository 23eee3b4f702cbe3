//! Batch creation API tests.
//!
//! Run with: `cargo test -p photowall-api --test batch_test`

mod helpers;

use bytes::Bytes;
use helpers::setup_test_app;
use photowall_db::PhotoCatalog;
use serde_json::json;

#[tokio::test]
async fn test_create_batch_is_idempotent() {
    let app = setup_test_app();
    let client = app.client();

    let first = client
        .post("/batch")
        .json(&json!({
            "batchId": "B1",
            "uploaderName": "  Alice  ",
            "comment": "Table 4"
        }))
        .await;
    assert_eq!(first.status_code(), 200, "create batch");
    let body: serde_json::Value = first.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["existing"], false);
    assert_eq!(body["batch"]["id"], "B1");
    assert_eq!(body["batch"]["uploaderName"], "Alice");
    assert_eq!(body["batch"]["comment"], "Table 4");
    let created_at = body["batch"]["timestamp"].as_i64().expect("timestamp");

    // A retry with different fields returns the stored batch untouched
    let second = client
        .post("/batch")
        .json(&json!({ "batchId": "B1", "uploaderName": "Bob" }))
        .await;
    assert_eq!(second.status_code(), 200, "repeat create batch");
    let body: serde_json::Value = second.json();
    assert_eq!(body["existing"], true);
    assert_eq!(body["batch"]["uploaderName"], "Alice");
    assert_eq!(body["batch"]["timestamp"].as_i64(), Some(created_at));

    let stored = app.catalog.get_batch("B1").await.unwrap().expect("stored");
    assert_eq!(stored.uploader_name, "Alice");
}

#[tokio::test]
async fn test_blank_comment_is_not_stored() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/batch")
        .json(&json!({ "batchId": "B2", "uploaderName": "Carol", "comment": "   " }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert!(body["batch"].get("comment").is_none());
}

#[tokio::test]
async fn test_create_batch_requires_fields() {
    let app = setup_test_app();
    let client = app.client();

    let missing_name = client
        .post("/batch")
        .json(&json!({ "batchId": "B1" }))
        .await;
    assert_eq!(missing_name.status_code(), 400);
    let body: serde_json::Value = missing_name.json();
    assert_eq!(body["code"], "INVALID_INPUT");

    let missing_id = client
        .post("/batch")
        .json(&json!({ "uploaderName": "Alice" }))
        .await;
    assert_eq!(missing_id.status_code(), 400);

    let bad_id = client
        .post("/batch")
        .json(&json!({ "batchId": "../etc", "uploaderName": "Alice" }))
        .await;
    assert_eq!(bad_id.status_code(), 400);

    assert!(app.catalog.get_all_batches().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/batch")
        .content_type("application/json")
        .bytes(Bytes::from_static(b"{\"batchId\": "))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["error"]
        .as_str()
        .is_some_and(|e| e.starts_with("Invalid request body")));
}
