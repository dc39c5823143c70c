use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// --- Core Application Schemas (Mapped to Database) ---

/// Usuario
///
/// Represents a user account row from the `usuarios` table. This is the only
/// record type the application reads back as a typed struct: the credential
/// check on `/auth` needs the stored bcrypt hash and the role, so the row is
/// fetched in full rather than through the generic resource path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Usuario {
    pub id: i64,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub telefono: String,
    // The authorization tag: 1 = admin, 2 = any other role.
    pub rol_id: i32,
    // bcrypt hash, never the plaintext. Never serialized out to a view.
    pub password: String,
}

/// Rol
///
/// The coarse authorization tag attached to a user record. The mapping from the
/// registration form string is **total**: exactly "admin" maps to `Admin`, every
/// other string maps to `Otro`. There is deliberately no rejection branch for an
/// unrecognized role string (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rol {
    Admin,
    Otro,
}

impl Rol {
    /// Total mapping from the submitted `rol_id` form string.
    pub fn desde_formulario(valor: &str) -> Rol {
        if valor == "admin" { Rol::Admin } else { Rol::Otro }
    }

    /// The numeric id stored in the `rol_id` column.
    pub fn id(self) -> i32 {
        match self {
            Rol::Admin => 1,
            Rol::Otro => 2,
        }
    }
}

// --- View Metadata ---

/// Alerta
///
/// Metadata for the client-side popup rendered by the views (SweetAlert-style).
/// Serialized into the template context with the exact key names the popup
/// script consumes, hence the camelCase rename.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alerta {
    pub alert: bool,
    pub alert_title: String,
    pub alert_message: String,
    pub alert_icon: String,
    pub show_confirm_button: bool,
    pub timer: Option<u32>,
    // Path the popup navigates to after it is dismissed.
    pub ruta: String,
}

impl Alerta {
    /// A blocking error popup (confirm button, no auto-dismiss).
    pub fn error(mensaje: &str, ruta: &str) -> Self {
        Self {
            alert: true,
            alert_title: "Error".to_string(),
            alert_message: mensaje.to_string(),
            alert_icon: "error".to_string(),
            show_confirm_button: true,
            timer: None,
            ruta: ruta.to_string(),
        }
    }

    /// A blocking warning popup, used for incomplete login submissions.
    pub fn advertencia(mensaje: &str, ruta: &str) -> Self {
        Self {
            alert: true,
            alert_title: "Advertencia".to_string(),
            alert_message: mensaje.to_string(),
            alert_icon: "warning".to_string(),
            show_confirm_button: true,
            timer: None,
            ruta: ruta.to_string(),
        }
    }

    /// A transient success popup that dismisses itself after 1.5 seconds.
    pub fn exito(titulo: &str, mensaje: &str, ruta: &str) -> Self {
        Self {
            alert: true,
            alert_title: titulo.to_string(),
            alert_message: mensaje.to_string(),
            alert_icon: "success".to_string(),
            show_confirm_button: false,
            timer: Some(1500),
            ruta: ruta.to_string(),
        }
    }
}

// --- Request Payloads (Form Schemas) ---

/// RegistroForm
///
/// Input payload for the self-service registration form (POST /register).
/// Every field defaults to the empty string so a missing form key reaches the
/// handler's own validation instead of being rejected by the extractor; the
/// handler treats empty and absent identically.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RegistroForm {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub telefono: String,
    // The raw role string; mapped through `Rol::desde_formulario`.
    pub rol_id: String,
    pub password: String,
}

/// LoginForm
///
/// Input payload for the login form (POST /auth).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub pass: String,
}
