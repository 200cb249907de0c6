// main.rs
use poem::listener::TcpListener;
use poem_blog::config::AppConfig;
use poem_blog::session::SessionManager;
use poem_blog::{AppState, build_app, db};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let config = AppConfig::from_env()?;

    let db = db::connect(&config.database).await?;
    let sessions = SessionManager::new(
        config.session.secret.as_bytes(),
        config.session.ttl,
        config.session.remember_ttl,
    );
    let app = build_app(AppState::new(db, sessions));

    tracing::info!("Starting server on {}", config.bind_addr);
    poem::Server::new(TcpListener::bind(config.bind_addr))
        .run(app)
        .await?;
    Ok(())
}
