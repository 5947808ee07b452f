use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, AuthService, OrderService, SeaOrmAccountService, SeaOrmAuthService,
    SeaOrmOrderService,
};

mod accounts;
pub mod auth;
mod error;
mod observability;
mod orders;
mod reports;
mod types;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,

    pub accounts: Arc<dyn AccountService>,

    pub orders: Arc<dyn OrderService>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    if store.ensure_bootstrap_admin(&config.auth).await? {
        tracing::warn!("Bootstrap administrator was missing or demoted; account restored");
    }

    let auth: Arc<dyn AuthService> =
        Arc::new(SeaOrmAuthService::new(store.clone(), config.auth.clone()));
    let accounts: Arc<dyn AccountService> =
        Arc::new(SeaOrmAccountService::new(store.clone(), config.auth.clone()));
    let orders: Arc<dyn OrderService> = Arc::new(SeaOrmOrderService::new(store.clone()));

    Ok(Arc::new(AppState {
        config,
        store,
        auth,
        accounts,
        orders,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.config.server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.server.session_inactivity_minutes,
        )));

    let api_router = Router::new()
        .merge(create_protected_router())
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/health", get(observability::get_health))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_account))
        .route("/auth/password", put(auth::change_password))
        .route("/accounts", get(accounts::list_accounts))
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/{username}", put(accounts::update_account))
        .route("/accounts/{username}", delete(accounts::delete_account))
        .route("/accounts/{username}/points", post(accounts::adjust_points))
        .route("/orders", get(orders::list_orders))
        .route("/orders", post(orders::purchase))
        .route("/orders/{id}/fulfill", post(orders::fulfill_order))
        .route("/reports/users", get(reports::export_accounts))
        .route("/reports/orders", get(reports::export_orders))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(auth::auth_middleware))
}
