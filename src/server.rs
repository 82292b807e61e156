use std::io;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::TokenIssuer;
use crate::config::{AppConfig, SecurityConfig, StoreBackend};
use crate::database::{CatalogStore, CredentialStore, DatabaseManager, MemoryStore, PgStore};
use crate::handlers::{health, protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Wire up stores and services for the configured backend
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let tokens = TokenIssuer::from_config(&config.security).context("invalid JWT settings")?;

    let (products, users): (Arc<dyn CatalogStore>, Arc<dyn CredentialStore>) =
        match config.database.backend {
            StoreBackend::Memory => {
                warn!("Using the in-memory store; data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                (store.clone() as Arc<dyn CatalogStore>, store as Arc<dyn CredentialStore>)
            }
            StoreBackend::Postgres => {
                let pool = DatabaseManager::connect(&config.database)
                    .await
                    .context("failed to connect to PostgreSQL")?;
                let store = Arc::new(PgStore::new(pool));
                (store.clone() as Arc<dyn CatalogStore>, store as Arc<dyn CredentialStore>)
            }
        };

    Ok(AppState::new(config, products, users, tokens))
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .merge(auth_routes())
        .merge(product_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

/// Reads are public; writes pass through the bearer guard
fn product_routes(state: AppState) -> Router<AppState> {
    use protected::products as write;
    use public::products as read;

    let guard = middleware::from_fn_with_state(state, jwt_auth_middleware);

    Router::new()
        .route(
            "/products",
            get(read::products_list).merge(
                post(write::product_create)
                    .delete(write::products_delete_many)
                    .route_layer(guard.clone()),
            ),
        )
        .route(
            "/products/:id",
            get(read::product_show).merge(
                put(write::product_update)
                    .delete(write::product_delete)
                    .route_layer(guard),
            ),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Bind `host:port`, moving on to the next port while the current one is in
/// use, for at most `attempts` ports
pub async fn bind_with_retry(host: &str, port: u16, attempts: u16) -> anyhow::Result<TcpListener> {
    let mut candidate = port;
    for attempt in 1..=attempts.max(1) {
        match TcpListener::bind((host, candidate)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse && attempt < attempts => {
                let next = candidate
                    .checked_add(1)
                    .ok_or_else(|| anyhow!("ran out of ports after {}", candidate))?;
                warn!("Port {} is in use, trying port {}...", candidate, next);
                candidate = next;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to bind {}:{}", host, candidate))
            }
        }
    }
    Err(anyhow!("no free port in {}..={}", port, candidate))
}

/// Serve until Ctrl-C (or SIGTERM on unix)
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
