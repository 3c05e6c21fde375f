//! Common test utilities for prompt-relay integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use prompt_relay::config::RelayConfig;
use prompt_relay::services::providers::mock::MockTextProvider;
use prompt_relay::services::providers::TextProvider;
use prompt_relay::startup::{build_router, AppState};
use service_core::config::Config;
use std::collections::HashMap;
use std::sync::Arc;

/// Relay configuration bound to a random local port.
pub fn test_config(vars: &[(&str, &str)]) -> RelayConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let common = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        log_level: "debug".to_string(),
    };

    RelayConfig::from_lookup(common, |key| vars.get(key).cloned())
        .expect("Failed to build test config")
}

/// Router backed by `provider`, without binding a socket.
pub fn app_with(provider: impl TextProvider + 'static) -> Router {
    build_router(AppState {
        text_provider: Arc::new(provider),
    })
}

pub fn mock_app() -> Router {
    app_with(MockTextProvider::new())
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}
