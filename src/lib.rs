use axum::{extract::FromRef, http::HeaderName, Router};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod config;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;
pub mod resource;
pub mod session;
pub mod views;

// Module for routing segregation (pages, credentials, resource CRUD).
pub mod routes;
use routes::{auth, pages, resources};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use views::Views;

/// AppState
///
/// Implements the **Unified State Pattern**: the single, thread-safe, immutable
/// container holding all essential application services and configuration,
/// shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: abstracts database access behind the Repository trait.
    pub repo: RepositoryState,
    /// View renderer: the shared Tera instance over the embedded templates.
    pub views: Views,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow handlers to extract only the sub-state they
// use: the repo-only delete handler takes `State<RepositoryState>`, the
// render-only page handlers take `State<Views>`.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for Views {
    fn from_ref(app_state: &AppState) -> Views {
        app_state.views.clone()
    }
}

/// create_router
///
/// Assembles the application's entire routing structure, applies the session
/// and observability layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. Session Layer Configuration
    // Cookie-keyed server-side sessions. The store is in-process; session-store
    // internals are an external concern behind tower-sessions.
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store).with_secure(false);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Server-rendered pages and the liveness probe.
        .merge(pages::page_routes())
        // Registration, login, logout.
        .merge(auth::auth_routes())
        // The generic CRUD contract, instantiated once per resource schema.
        .merge(resources::resource_routes(&resource::USUARIOS))
        .merge(resources::resource_routes(&resource::PROFESIONALES))
        .merge(resources::resource_routes(&resource::PROVEEDORES))
        // Apply the Unified State to all routes.
        .with_state(state)
        // The session layer wraps every route; the SesionUsuario extractor
        // depends on it being present.
        .layer(session_layer);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router.layer(
        ServiceBuilder::new()
            // 3a. Request ID Generation: a unique UUID for every incoming request.
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            // 3b. Request Tracing: wraps the request/response lifecycle in a
            // tracing span correlated by the generated request ID.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // 3c. Request ID Propagation: returns the x-request-id header to
            // the client.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Helper function used by `TraceLayer` to customize the tracing span creation.
/// It extracts the `x-request-id` header (if present) and includes it in the
/// structured logging metadata alongside the HTTP method and URI, so every log
/// line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
