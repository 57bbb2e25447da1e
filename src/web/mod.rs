use axum::{
    Router, middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer, cookie::SameSite};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, NotesService, SeaOrmAuthService, SeaOrmNotesService};

mod accounts;
pub mod auth;
mod entries;
mod error;
mod observability;
pub mod pages;
mod topics;
mod validation;

pub use error::WebError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sessionid";

const INDEX: &str = "/";
const TOPICS: &str = "/topics/";
const TOPIC: &str = "/topics/{topic_id}/";
const NEW_TOPIC: &str = "/new_topic/";
const NEW_ENTRY: &str = "/new_entry/{topic_id}/";
const EDIT_ENTRY: &str = "/edit_entry/{entry_id}/";
const REGISTER: &str = "/accounts/register/";
const LOGOUT: &str = "/accounts/logout/";

/// Every page route. `{..}` segments match any single path segment.
const PAGE_ROUTES: [&str; 9] = [
    INDEX,
    TOPICS,
    TOPIC,
    NEW_TOPIC,
    NEW_ENTRY,
    EDIT_ENTRY,
    REGISTER,
    auth::LOGIN_PATH,
    LOGOUT,
];

/// Whether `path` would be served by one of the page routes.
#[must_use]
pub fn is_page_route(path: &str) -> bool {
    PAGE_ROUTES.iter().any(|template| {
        let mut wanted = template.split('/');
        let mut actual = path.split('/');
        loop {
            match (wanted.next(), actual.next()) {
                (None, None) => return true,
                (Some(w), Some(a)) if w.starts_with('{') && !a.is_empty() => {}
                (Some(w), Some(a)) if w == a => {}
                _ => return false,
            }
        }
    })
}

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,

    pub notes: Arc<dyn NotesService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// State backed by the SeaORM services over `store`.
    #[must_use]
    pub fn new(config: Config, store: Store, prometheus_handle: Option<PrometheusHandle>) -> Self {
        let auth: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        ));
        let notes: Arc<dyn NotesService> = Arc::new(SeaOrmNotesService::new(store.clone()));

        Self::with_services(config, store, auth, notes, prometheus_handle)
    }

    #[must_use]
    pub fn with_services(
        config: Config,
        store: Store,
        auth: Arc<dyn AuthService>,
        notes: Arc<dyn NotesService>,
        prometheus_handle: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config,
            store,
            auth,
            notes,
            prometheus_handle,
        }
    }
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

    Ok(Arc::new(AppState::new(config, store, prometheus_handle)))
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let session_store = SqliteStore::new(state.store.sqlite_pool().clone());
    session_store.migrate().await?;

    let server = &state.config.server;
    let session_layer = SessionManagerLayer::new(session_store)
        .with_name(SESSION_COOKIE)
        .with_secure(server.secure_cookies)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_expiry_minutes,
        )));

    let protected_routes = create_protected_router(state.clone());

    let mut app = Router::new()
        .merge(protected_routes)
        .route(INDEX, get(topics::index))
        .route(REGISTER, post(accounts::register).fallback(accounts::register_form))
        .route(auth::LOGIN_PATH, post(accounts::login).fallback(accounts::login_form))
        .route(LOGOUT, post(accounts::logout).get(accounts::logout));

    if state.config.observability.metrics_enabled {
        app = app.route("/metrics", get(observability::get_metrics));
    }

    Ok(app
        .fallback(error::fallback)
        .layer(session_layer)
        .with_state(state)
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http()))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(TOPICS, get(topics::list_topics))
        .route(TOPIC, get(topics::show_topic))
        .route(NEW_TOPIC, post(topics::create_topic).fallback(topics::new_topic_form))
        .route(NEW_ENTRY, post(entries::create_entry).fallback(entries::new_entry_form))
        .route(EDIT_ENTRY, post(entries::update_entry).fallback(entries::edit_entry_form))
        .route_layer(middleware::from_fn_with_state(state, auth::login_required))
}
