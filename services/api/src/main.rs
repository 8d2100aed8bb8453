use anyhow::Result;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod auth;
mod documents;
mod error;
mod jwt;
mod middleware;
mod models;
mod routes;
mod state;
mod store;
mod throttle;
mod validation;

use common::database::{DatabaseConfig, ensure_documents_table, health_check, init_pool};

use crate::auth::AuthService;
use crate::documents::DocumentAccessor;
use crate::jwt::{JwtConfig, JwtService};
use crate::state::AppState;
use crate::store::{DocumentStore, PgStore};
use crate::throttle::{LoginThrottle, ThrottleConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting document store API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    ensure_documents_table(&pool).await?;

    // Initialize services; the store handle is created once here and
    // injected into every component that needs it
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config);

    let store: Arc<dyn DocumentStore> = Arc::new(PgStore::new(pool));
    let accessor = DocumentAccessor::new(store.clone());
    let auth_service = AuthService::new(accessor.clone(), jwt_service.clone());
    let login_throttle = LoginThrottle::new(ThrottleConfig::default());

    let app_state = AppState {
        store,
        accessor,
        auth_service,
        jwt_service,
        login_throttle,
    };

    info!("Document store API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Document store API listening on 0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
