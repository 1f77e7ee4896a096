//! Helpers for driving the API in integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;

use streamus_api::controllers::PlaylistItemController;
use streamus_api::routes::app_router;
use streamus_api::services::{PlaylistItemManager, PlaylistManager};
use streamus_api::{InMemoryPlaylistStore, ManagerFactory, Session};

/// Controller and managers sharing one session over an in-memory store
pub struct TestContext {
    pub store: Arc<InMemoryPlaylistStore>,
    pub session: Arc<Session>,
    pub controller: PlaylistItemController,
    pub playlist_manager: PlaylistManager,
    pub item_manager: PlaylistItemManager,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryPlaylistStore::new());
        let session = Arc::new(Session::new(store.clone()));
        let factory = ManagerFactory::new();

        Self {
            controller: PlaylistItemController::new(Arc::clone(&session), &factory),
            playlist_manager: factory.playlist_manager(&session),
            item_manager: factory.playlist_item_manager(&session),
            store,
            session,
        }
    }
}

/// Full application router over a fresh in-memory store
pub fn test_app(batch_limit: usize) -> Router {
    app_router(Arc::new(InMemoryPlaylistStore::new()), batch_limit)
}

/// Send one request and decode the JSON body (Null when empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Send a JSON body
pub async fn send_json<T: Serialize>(
    app: &Router,
    method: Method,
    uri: &str,
    body: &T,
) -> (StatusCode, Value) {
    send(app, method, uri, Some(serde_json::to_string(body).unwrap())).await
}
