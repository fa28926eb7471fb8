//! Shared harness for the REST integration tests: an app wired to a fresh
//! in-memory store and a recording bot gateway, plus a oneshot request
//! helper.

// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use api_lib::config::Config;
use api_lib::web::{self, state::AppState};
use timetrack_core::ports::{BotGateway, PortResult, WebAppButton};
use timetrack_core::MemoryStore;

pub const BOT_TOKEN: &str = "12345:test-token";

/// A `BotGateway` that records outbound messages instead of sending them.
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl BotGateway for RecordingGateway {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        _buttons: &[WebAppButton],
    ) -> PortResult<()> {
        self.sent.lock().await.push((chat_id, text.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub gateway: Arc<RecordingGateway>,
}

pub fn test_config(bot_token: Option<&str>) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        bot_token: bot_token.map(String::from),
        webapp_url: "http://localhost:3000".to_string(),
        log_level: tracing::Level::INFO,
    }
}

pub fn test_app() -> TestApp {
    test_app_with_config(test_config(Some(BOT_TOKEN)))
}

pub fn test_app_with_config(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(RecordingGateway::default());
    let state = Arc::new(AppState::new(store, gateway.clone(), Arc::new(config)));
    TestApp {
        router: web::router(state.clone()),
        state,
        gateway,
    }
}

/// Sends one request and returns `(status, parsed JSON body)`.
pub async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    user: Option<Uuid>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
