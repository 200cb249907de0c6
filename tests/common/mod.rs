#![allow(dead_code)]

use std::time::Duration;

use poem::Endpoint;
use poem::http::header;
use poem::test::{TestClient, TestResponse};
use poem_blog::config::DatabaseConfig;
use poem_blog::session::SessionManager;
use poem_blog::{AppState, build_app, db};

pub async fn client() -> (TestClient<impl Endpoint>, AppState) {
    let db = db::connect(&DatabaseConfig::in_memory()).await.unwrap();
    let sessions = SessionManager::new(
        b"integration-secret",
        Duration::from_secs(60 * 60),
        Duration::from_secs(30 * 24 * 60 * 60),
    );
    let state = AppState::new(db, sessions);
    (TestClient::new(build_app(state.clone())), state)
}

/// The full `Set-Cookie` header the response sent for `name`, if any.
pub fn set_cookie(resp: &TestResponse, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    resp.0
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .map(str::to_owned)
}

/// The value part of a `Set-Cookie` header.
pub fn cookie_value(set_cookie: &str) -> &str {
    let pair = set_cookie.split(';').next().unwrap_or_default();
    pair.split_once('=').map(|(_, value)| value).unwrap_or_default()
}

pub fn location(resp: &TestResponse) -> Option<String> {
    resp.0
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

pub async fn body(resp: TestResponse) -> String {
    resp.0.into_body().into_string().await.unwrap()
}
