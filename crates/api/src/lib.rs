//! Fire-Alarm API Server
//!
//! REST surface over the ingestion pipeline and the stores: hardware posts
//! readings and polls alarm state, the frontend reads per-unit status, and
//! the user endpoints handle registration and bearer-token login.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod routes;
mod settings;

pub use error::ApiError;
pub use settings::Settings;

use auth::{TokenSigner, UserDirectory};
use ingest::IngestionPipeline;
use notify::{AlarmNotifier, PushClient};
use storage::{AggregateStore, ConfigStore, MemoryStore, ReadingStore, UserStore};

/// Application state shared across handlers
pub struct AppState {
    /// The write path for sensor hardware
    pub pipeline: IngestionPipeline,
    /// Read access for the status endpoints
    pub aggregates: Arc<dyn AggregateStore>,
    pub configs: Arc<dyn ConfigStore>,
    /// Account operations
    pub users: UserDirectory,
    /// Bearer-token issue/verify
    pub tokens: TokenSigner,
}

impl AppState {
    /// Wire up production state from the runtime settings.
    pub fn new(settings: &Settings) -> Self {
        let store = Arc::new(MemoryStore::new());
        let notifier: Arc<dyn AlarmNotifier> =
            Arc::new(PushClient::new(settings.notify_url.clone()));
        Self::with_parts(
            store,
            Some(notifier),
            TokenSigner::new(&settings.jwt_secret, settings.token_ttl_minutes),
        )
    }

    /// Assemble state from explicit parts. Tests inject a bare store and
    /// skip the push client.
    pub fn with_parts(
        store: Arc<MemoryStore>,
        notifier: Option<Arc<dyn AlarmNotifier>>,
        tokens: TokenSigner,
    ) -> Self {
        let pipeline = IngestionPipeline::new(
            store.clone() as Arc<dyn ReadingStore>,
            store.clone() as Arc<dyn AggregateStore>,
            store.clone() as Arc<dyn ConfigStore>,
            notifier,
        );
        Self {
            pipeline,
            aggregates: store.clone() as Arc<dyn AggregateStore>,
            configs: store.clone() as Arc<dyn ConfigStore>,
            users: UserDirectory::new(store as Arc<dyn UserStore>),
            tokens,
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/fire-alarm/get-record", get(routes::fire_alarm::get_record))
        .route("/fire-alarm/alarm", get(routes::fire_alarm::alarm))
        .route("/fire-alarm/update", post(routes::fire_alarm::update))
        .route("/users/register", post(routes::users::register))
        .route("/users/login", post(routes::users::login))
        .route("/users/me/", get(routes::users::me))
        .route("/users/me/items/", get(routes::users::me_items))
        .layer(TraceLayer::new_for_http())
        // The dashboard is served from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server
pub async fn run_server(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
