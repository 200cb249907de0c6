//! A server-rendered blog with categories, accounts and cookie sessions.

pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod flash;
pub mod forms;
pub mod migration;
pub mod password;
pub mod routes;
pub mod session;
pub mod store;
pub mod views;

use std::sync::Arc;

use poem::endpoint::StaticFilesEndpoint;
use poem::middleware::{CookieJarManager, Tracing};
use poem::{Endpoint, EndpointExt, Route, get};
use poem_openapi::OpenApiService;
use sea_orm::DatabaseConnection;

use crate::routes::{auth, blog, pages};
use crate::session::SessionManager;
use crate::store::Store;

/// Everything a request handler needs, attached with `.data(..)`.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, sessions: SessionManager) -> Self {
        Self {
            store: Store::new(db),
            sessions: Arc::new(sessions),
        }
    }
}

pub fn build_app(state: AppState) -> impl Endpoint {
    let api = OpenApiService::new(api::Api::new(state.clone()), "Blog API", "1.0").server("/api");
    let ui = api.swagger_ui();

    Route::new()
        .at("/", get(pages::home))
        .at("/home/", get(pages::home))
        .at("/about/", get(pages::about))
        .at("/contact/", get(pages::contact))
        .at("/videos/", get(pages::videos))
        .at("/createblog/", get(pages::create_blog))
        .at("/blog/", get(blog::list_posts).post(blog::create_post))
        .at("/update/:id", get(blog::edit_post).post(blog::update_post))
        .at("/delete/:id", get(blog::delete_post))
        .at("/signup/", get(auth::sign_up_form).post(auth::sign_up))
        .at("/signin/", get(auth::sign_in_form).post(auth::sign_in))
        .at("/signout", get(auth::sign_out))
        .at("/profile/", get(auth::profile).post(auth::update_profile))
        .nest("/api", api)
        .nest("/api/docs", ui)
        .nest(
            "/static",
            StaticFilesEndpoint::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .with(CookieJarManager::new())
        .with(Tracing)
        .data(state)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::DatabaseConfig;

    #[tokio::test]
    async fn test_build_app_with_in_memory_state() {
        let db = db::connect(&DatabaseConfig::in_memory()).await.unwrap();
        let sessions =
            SessionManager::new(b"secret", Duration::from_secs(60), Duration::from_secs(600));
        let _app = build_app(AppState::new(db, sessions));
    }
}
