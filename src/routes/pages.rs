use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Page Router Module
///
/// The server-rendered screens. Each handler reads the request's session
/// context and renders either the authenticated view or the private-area
/// placeholder; no data is fetched for anonymous requests.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and the HTTP
        // test harness. Returns "ok" immediately.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // The landing view: greets the logged-in user or prompts for login.
        .route("/", get(handlers::inicio))
        // GET /login and GET /registro
        // The credential forms, rendered with the session's login flag.
        .route("/login", get(handlers::pagina_login))
        .route("/registro", get(handlers::pagina_registro))
        // GET /admin
        // The dashboard with the full user listing; fetched only when the
        // session is authenticated.
        .route("/admin", get(handlers::panel_admin))
}
