//! Live stream tests: SSE framing over HTTP and subscriber isolation.
//!
//! Run with: `cargo test -p photowall-api --test stream_test`

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use futures::{Stream, StreamExt};
use helpers::{create_batch, setup_test_app, setup_test_app_with, upload_jpeg, TestOptions};
use photowall_api::services::broadcast::{ChannelSink, StreamFrame};
use photowall_core::models::StreamEvent;
use tower::ServiceExt;

/// One parsed SSE frame.
#[derive(Debug)]
enum Frame {
    Data(serde_json::Value),
    Comment(String),
}

/// Incrementally splits an SSE body into frames.
struct SseReader<S> {
    body: S,
    buffer: String,
}

impl<S> SseReader<S>
where
    S: Stream<Item = Result<Bytes, axum::Error>> + Unpin,
{
    fn new(body: S) -> Self {
        Self {
            body,
            buffer: String::new(),
        }
    }

    async fn next_frame(&mut self) -> Frame {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let raw: String = self.buffer.drain(..end + 2).collect();
                return parse_frame(raw.trim_end());
            }
            let chunk = tokio::time::timeout(Duration::from_secs(5), self.body.next())
                .await
                .expect("timed out waiting for SSE frame")
                .expect("stream ended")
                .expect("body error");
            self.buffer.push_str(std::str::from_utf8(&chunk).expect("utf-8 frame"));
        }
    }

    async fn next_data(&mut self) -> serde_json::Value {
        loop {
            if let Frame::Data(value) = self.next_frame().await {
                return value;
            }
        }
    }
}

fn parse_frame(raw: &str) -> Frame {
    let mut data = String::new();
    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("data:") {
            data.push_str(rest.trim_start());
        } else if let Some(rest) = line.strip_prefix(':') {
            return Frame::Comment(rest.trim().to_string());
        }
    }
    Frame::Data(serde_json::from_str(&data).expect("JSON data frame"))
}

async fn open_stream(router: axum::Router) -> axum::response::Response {
    let request = Request::get("/photos/stream")
        .body(Body::empty())
        .expect("request");
    router.oneshot(request).await.expect("infallible router")
}

#[tokio::test]
async fn test_stream_sends_snapshot_then_live_events() {
    let app = setup_test_app();
    create_batch(app.client(), "B1", "Alice").await;
    upload_jpeg(app.client(), "B1", "P1").await;

    let response = open_stream(app.router.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    assert_eq!(app.state.hub.subscriber_count(), 1);

    let mut reader = SseReader::new(response.into_body().into_data_stream());

    let count = reader.next_data().await;
    assert_eq!(count["type"], "totalCount");
    assert_eq!(count["count"], 1);
    let snapshot = reader.next_data().await;
    assert_eq!(snapshot["type"], "photo");
    assert_eq!(snapshot["id"], "P1");

    upload_jpeg(app.client(), "B1", "P2").await;

    let live = reader.next_data().await;
    assert_eq!(live["type"], "photo");
    assert_eq!(live["id"], "P2");
    assert_eq!(live["uploaderName"], "Alice");
    let count = reader.next_data().await;
    assert_eq!(count, serde_json::json!({ "type": "totalCount", "count": 2 }));

    drop(reader);
    assert_eq!(app.state.hub.subscriber_count(), 0, "disconnect unsubscribes");
}

#[tokio::test]
async fn test_snapshot_is_oldest_first() {
    let app = setup_test_app();
    create_batch(app.client(), "B1", "Alice").await;
    for id in ["P1", "P2", "P3"] {
        upload_jpeg(app.client(), "B1", id).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let response = open_stream(app.router.clone()).await;
    let mut reader = SseReader::new(response.into_body().into_data_stream());

    assert_eq!(reader.next_data().await["count"], 3);
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(reader.next_data().await["id"].as_str().unwrap().to_string());
    }
    assert_eq!(ids, vec!["P1", "P2", "P3"]);
}

#[tokio::test]
async fn test_stream_reports_catalog_failure_and_stays_open() {
    let app = setup_test_app();
    app.catalog.set_unavailable(true);

    let response = open_stream(app.router.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let mut reader = SseReader::new(response.into_body().into_data_stream());

    let first = reader.next_data().await;
    assert_eq!(first["type"], "error");
    assert_eq!(first["message"], "Failed to load photo count");
    let second = reader.next_data().await;
    assert_eq!(second["type"], "error");
    assert_eq!(second["message"], "Failed to load recent photos");

    assert_eq!(app.state.hub.subscriber_count(), 1);
}

#[tokio::test]
async fn test_idle_stream_gets_heartbeats() {
    let app = setup_test_app_with(TestOptions {
        stream_heartbeat_secs: 1,
        ..TestOptions::default()
    });

    let response = open_stream(app.router.clone()).await;
    let mut reader = SseReader::new(response.into_body().into_data_stream());

    let count = reader.next_data().await;
    assert_eq!(count["count"], 0);

    match reader.next_frame().await {
        Frame::Comment(text) => assert_eq!(text, "keep-alive"),
        Frame::Data(value) => panic!("expected heartbeat, got {}", value),
    }
}

#[tokio::test]
async fn test_failed_subscriber_does_not_block_others() {
    let app = setup_test_app();
    create_batch(app.client(), "B1", "Alice").await;

    let (first, mut first_rx) = ChannelSink::channel(8);
    let (broken, broken_rx) = ChannelSink::channel(8);
    let (third, mut third_rx) = ChannelSink::channel(8);
    app.state.hub.subscribe(Arc::new(first));
    app.state.hub.subscribe(Arc::new(broken));
    app.state.hub.subscribe(Arc::new(third));
    drop(broken_rx);
    assert_eq!(app.state.hub.subscriber_count(), 3);

    upload_jpeg(app.client(), "B1", "P1").await;

    for rx in [&mut first_rx, &mut third_rx] {
        match rx.recv().await {
            Some(StreamFrame::Event(StreamEvent::Photo(photo))) => assert_eq!(photo.id, "P1"),
            other => panic!("expected photo event, got {:?}", other),
        }
        assert_eq!(
            rx.recv().await,
            Some(StreamFrame::Event(StreamEvent::TotalCount { count: 1 }))
        );
    }
    assert_eq!(app.state.hub.subscriber_count(), 2, "broken sink removed");
}
