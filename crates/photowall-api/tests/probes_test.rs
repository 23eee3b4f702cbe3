//! Health probes and API docs.
//!
//! Run with: `cargo test -p photowall-api --test probes_test`

mod helpers;

use helpers::setup_test_app;

#[tokio::test]
async fn test_probes_follow_catalog_health() {
    let app = setup_test_app();
    let client = app.client();

    let live = client.get("/live").await;
    assert_eq!(live.status_code(), 200);

    let ready = client.get("/ready").await;
    assert_eq!(ready.status_code(), 200);
    let health: serde_json::Value = client.get("/health").await.json();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["stream_subscribers"], 0);

    app.catalog.set_unavailable(true);
    let ready = client.get("/ready").await;
    assert_eq!(ready.status_code(), 503);
    let health = client.get("/health").await;
    assert_eq!(health.status_code(), 503);
    let body: serde_json::Value = health.json();
    assert_eq!(body["status"], "unhealthy");

    // Liveness does not depend on the database
    assert_eq!(client.get("/live").await.status_code(), 200);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app();
    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let doc: serde_json::Value = response.json();
    for path in ["/batch", "/upload", "/photos", "/photos/stream"] {
        assert!(doc["paths"].get(path).is_some(), "missing {}", path);
    }
}
