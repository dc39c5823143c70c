use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tower_sessions::Session;

// Session key names. Fixed by the cookie contract with deployed clients.
pub const CLAVE_LOGGEDIN: &str = "loggedin";
pub const CLAVE_NOMBRE: &str = "name";
pub const CLAVE_ROL: &str = "rol";

/// SesionUsuario
///
/// The request-scoped session context: who (if anyone) this request belongs
/// to. Resolved once at the start of the pipeline by the extractor below and
/// passed explicitly into handlers — there is no ambient session bag anywhere
/// in the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SesionUsuario {
    pub loggedin: bool,
    pub name: Option<String>,
    pub rol: Option<i32>,
}

impl SesionUsuario {
    /// The anonymous context, used when no session cookie resolves.
    pub fn anonima() -> Self {
        Self {
            loggedin: false,
            name: None,
            rol: None,
        }
    }
}

/// Reads one typed value from the session store, degrading to None on a store
/// failure so a broken session renders the unauthenticated branch instead of
/// failing the request.
async fn leer<T: DeserializeOwned>(session: &Session, clave: &str) -> Option<T> {
    match session.get::<T>(clave).await {
        Ok(valor) => valor,
        Err(e) => {
            tracing::error!("session read '{}' failed: {:?}", clave, e);
            None
        }
    }
}

/// SesionUsuario Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making SesionUsuario usable as a
/// function argument in any handler. This cleanly separates session resolution
/// (extractor) from business logic (the handler): handlers receive the resolved
/// context and never touch the session store for reads.
impl<S> FromRequestParts<S> for SesionUsuario
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Delegates cookie handling to the tower-sessions layer.
        let session = Session::from_request_parts(parts, state).await?;

        let loggedin = leer::<bool>(&session, CLAVE_LOGGEDIN).await.unwrap_or(false);
        if !loggedin {
            return Ok(SesionUsuario::anonima());
        }

        Ok(SesionUsuario {
            loggedin: true,
            name: leer(&session, CLAVE_NOMBRE).await,
            rol: leer(&session, CLAVE_ROL).await,
        })
    }
}

/// iniciar
///
/// Establishes the login session after a successful credential check.
pub async fn iniciar(
    session: &Session,
    nombre: &str,
    rol: i32,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(CLAVE_LOGGEDIN, true).await?;
    session.insert(CLAVE_NOMBRE, nombre).await?;
    session.insert(CLAVE_ROL, rol).await?;
    Ok(())
}

/// cerrar
///
/// Destroys the session: removes the server-side record and clears the cookie.
pub async fn cerrar(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
