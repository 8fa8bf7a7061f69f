//! Integration tests for the Contentful client against a local HTTP server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use catalog_sync_contentful_source::{ContentfulClient, ContentfulConfig};
use serde_json::json;
use sync_core::{RequestDescriptor, SourceClient, SyncError};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct ServerState {
    base_url: Arc<Mutex<String>>,
    seen: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn sync_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.seen.lock().unwrap().push(params.clone());

    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer secret");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "bad token").into_response();
    }

    let base = state.base_url.lock().unwrap().clone();
    if params.get("initial").map(String::as_str) == Some("true") {
        return Json(json!({
            "items": [
                {
                    "sys": {"id": "p-1", "type": "Entry", "createdAt": "2024-01-01T00:00:00Z"},
                    "fields": {"productName": {"en-US": "Lamp"}, "price": {"en-US": 19.99}}
                },
                {"sys": {"id": "p-0", "type": "DeletedEntry"}}
            ],
            "nextPageUrl": format!("{base}/spaces/space1/sync?sync_token=page-2")
        }))
        .into_response();
    }

    match params.get("sync_token").map(String::as_str) {
        Some("page-2") => Json(json!({
            "items": [],
            "nextSyncUrl": format!("{base}/spaces/space1/sync?sync_token=tok-1")
        }))
        .into_response(),
        Some("mixed") => Json(json!({
            "items": [
                {
                    "sys": {"id": "p-2", "type": "Entry"},
                    "fields": {"productName": {"en-US": "Desk"}}
                },
                {"sys": {"id": 42, "type": "Entry"}, "fields": {"productName": {"en-US": "Bad"}}},
                {"sys": null, "fields": null}
            ],
            "nextSyncUrl": format!("{base}/spaces/space1/sync?sync_token=tok-2")
        }))
        .into_response(),
        Some("blank") => Json(json!({
            "items": [{"sys": {"id": "p-3", "type": "Entry"}, "fields": {}}],
            "nextSyncUrl": ""
        }))
        .into_response(),
        Some("garbage") => (StatusCode::OK, "{not json").into_response(),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "try later").into_response(),
    }
}

async fn slow_handler() -> Response {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({"items": []})).into_response()
}

/// Start a test HTTP server imitating the sync endpoint
async fn start_test_server() -> anyhow::Result<(String, ServerState)> {
    let state = ServerState::default();
    let app = Router::new()
        .route("/spaces/space1/sync", get(sync_handler))
        .route("/slow", get(slow_handler))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let base_url = format!("http://{addr}");
    *state.base_url.lock().unwrap() = base_url.clone();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok((base_url, state))
}

fn client(base_url: &str, token: &str) -> ContentfulClient {
    ContentfulClient::new(
        ContentfulConfig::new("space1", token, "product")
            .with_base_url(base_url)
            .with_timeout(Duration::from_millis(300)),
    )
    .unwrap()
}

#[tokio::test]
async fn test_initial_page_then_chain_end() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .try_init();

    let (base_url, state) = start_test_server().await.unwrap();
    let client = client(&base_url, "secret");

    let page = tokio_test::assert_ok!(client.fetch_page(&client.initial_request()).await);
    assert_eq!(page.new_items.len(), 1);
    assert_eq!(page.deleted_ids, vec!["p-0".to_string()]);
    assert!(page.next_cursor.is_none());
    let next = page.next_page.clone().unwrap();
    assert_eq!(
        next,
        RequestDescriptor::next_page(format!("{base_url}/spaces/space1/sync?sync_token=page-2"))
    );

    let products = client.canonicalize(&page.new_items);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].as_ref().unwrap().name, "Lamp");

    let last = client.fetch_page(&next).await.unwrap();
    assert!(last.is_empty());
    assert!(last.next_page.is_none());
    assert_eq!(last.next_cursor.as_deref(), Some("tok-1"));

    let seen = state.seen.lock().unwrap();
    assert_eq!(seen[0].get("content_type").map(String::as_str), Some("product"));
    assert_eq!(seen[0].get("type").map(String::as_str), Some("Entry"));
    assert!(!seen[0].contains_key("access_token"));
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let (base_url, _state) = start_test_server().await.unwrap();
    let client = client(&base_url, "wrong");

    let err = client
        .fetch_page(&client.initial_request())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::SourceUnauthorized(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let (base_url, _state) = start_test_server().await.unwrap();
    let client = client(&base_url, "secret");

    let request = client.continuation_request("expired").unwrap();
    let err = client.fetch_page(&request).await.unwrap_err();
    assert!(matches!(err, SyncError::SourceUnavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_badly_shaped_entries_fail_alone() {
    let (base_url, _state) = start_test_server().await.unwrap();
    let client = client(&base_url, "secret");

    let request = client.continuation_request("mixed").unwrap();
    let page = tokio_test::assert_ok!(client.fetch_page(&request).await);
    assert_eq!(page.next_cursor.as_deref(), Some("tok-2"));

    let products = client.canonicalize(&page.new_items);
    assert_eq!(products.len(), 3);
    assert_eq!(products[0].as_ref().unwrap().external_id, "p-2");
    assert!(matches!(products[1], Err(SyncError::MalformedItem { id: None, .. })));
    assert!(matches!(products[2], Err(SyncError::MalformedItem { id: None, .. })));
}

#[tokio::test]
async fn test_blank_next_sync_url_yields_no_cursor() {
    let (base_url, _state) = start_test_server().await.unwrap();
    let client = client(&base_url, "secret");

    let request = client.continuation_request("blank").unwrap();
    let page = client.fetch_page(&request).await.unwrap();
    assert_eq!(page.new_items.len(), 1);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_invalid_body_is_unavailable() {
    let (base_url, _state) = start_test_server().await.unwrap();
    let client = client(&base_url, "secret");

    let request = client.continuation_request("garbage").unwrap();
    let err = client.fetch_page(&request).await.unwrap_err();
    assert!(matches!(err, SyncError::SourceUnavailable(_)));
}

#[tokio::test]
async fn test_timeout_is_unavailable() {
    let (base_url, _state) = start_test_server().await.unwrap();
    let client = client(&base_url, "secret");

    let request = RequestDescriptor::next_page(format!("{base_url}/slow"));
    let err = client.fetch_page(&request).await.unwrap_err();
    assert!(matches!(err, SyncError::SourceUnavailable(_)));
}

#[tokio::test]
async fn test_connection_refused_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{addr}"), "secret");
    let err = client
        .fetch_page(&client.initial_request())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::SourceUnavailable(_)));
}
