use crate::models::Alerta;
use crate::resource::{self, ResourceSchema};
use crate::repository::Record;
use crate::session::SesionUsuario;
use axum::{http::StatusCode, response::Html};
use std::sync::Arc;
use tera::{Context, Tera};

// Message shown in place of content on every screen that requires a session.
pub const AREA_PRIVADA: &str = "Área privada, inicie sesión para poder acceder al contenido.";

/// Views
///
/// The view renderer: a shared Tera instance loaded from the templates
/// embedded at compile time. Template internals are an external concern; this
/// wrapper only owns the render call and the failure mapping (render failure
/// is a 500, logged, never a panic on a request path).
#[derive(Clone)]
pub struct Views {
    tera: Arc<Tera>,
}

impl Views {
    /// Parses the embedded templates. Startup-only; a malformed template is a
    /// build defect, so this fails fast.
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("index.html", include_str!("../templates/index.html")),
            ("login.html", include_str!("../templates/login.html")),
            ("register.html", include_str!("../templates/register.html")),
            ("admin.html", include_str!("../templates/admin.html")),
            ("lista.html", include_str!("../templates/lista.html")),
            ("editar.html", include_str!("../templates/editar.html")),
        ])
        .expect("FATAL: embedded templates failed to parse");
        Self {
            tera: Arc::new(tera),
        }
    }

    /// render
    ///
    /// Renders one template with the given context. The data-object contract
    /// is the same for every view: a `login` flag, optionally `name`/`rol`,
    /// optionally `alerta` popup metadata, and for the list/edit screens the
    /// resource rows.
    pub fn render(
        &self,
        plantilla: &str,
        contexto: &Context,
    ) -> Result<Html<String>, (StatusCode, String)> {
        match self.tera.render(plantilla, contexto) {
            Ok(html) => Ok(Html(html)),
            Err(e) => {
                tracing::error!("render '{}' failed: {:?}", plantilla, e);
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error al generar la vista.".to_string(),
                ))
            }
        }
    }
}

impl Default for Views {
    fn default() -> Self {
        Self::new()
    }
}

// --- Context Shaping ---

/// Base context for a session-aware view: the `login` flag plus `name`/`rol`
/// when the session is authenticated.
pub fn contexto_sesion(sesion: &SesionUsuario) -> Context {
    let mut contexto = Context::new();
    contexto.insert("login", &sesion.loggedin);
    if let Some(name) = &sesion.name {
        contexto.insert("name", name);
    }
    if let Some(rol) = &sesion.rol {
        contexto.insert("rol", rol);
    }
    contexto
}

/// Adds the popup metadata under the key the base template's alert block reads.
pub fn con_alerta(contexto: &mut Context, alerta: &Alerta) {
    contexto.insert("alerta", alerta);
}

/// Context for the generic list view: resource identity, ordered field names,
/// and the fetched rows.
pub fn contexto_lista(sesion: &SesionUsuario, schema: &'static ResourceSchema, filas: &[Record]) -> Context {
    let mut contexto = contexto_sesion(sesion);
    contexto.insert("tabla", schema.table);
    contexto.insert("campos", &resource::nombres_de_campos(schema));
    contexto.insert("tiene_password", &schema.password_field.is_some());
    contexto.insert("results", filas);
    contexto
}

/// Context for the pre-filled edit form. Records never contain the password
/// column, so password inputs always render empty.
pub fn contexto_edicion(
    sesion: &SesionUsuario,
    schema: &'static ResourceSchema,
    registro: &Record,
) -> Context {
    let mut contexto = contexto_sesion(sesion);
    contexto.insert("tabla", schema.table);
    contexto.insert("campos", &resource::nombres_de_campos(schema));
    contexto.insert("tiene_password", &schema.password_field.is_some());
    contexto.insert("registro", registro);
    contexto
}
