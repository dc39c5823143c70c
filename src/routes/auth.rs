use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Credential Router Module
///
/// The three routes that create, establish, and destroy a login session.
/// These render form views with alert metadata rather than plain statuses:
/// the browser flow expects a page back, not an API response.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        // POST /register
        // Self-service account creation from the registration form. Hashes the
        // password before insert; never touches the session.
        .route("/register", post(handlers::registrar))
        // POST /auth
        // The credential check. On success the session is written with the
        // user's name and role.
        .route("/auth", post(handlers::autenticar))
        // GET /logout
        // Destroys the session and redirects to the landing page.
        .route("/logout", get(handlers::cerrar_sesion))
}
