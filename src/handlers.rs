use crate::{
    AppState,
    models::{Alerta, LoginForm, RegistroForm, Rol},
    password,
    repository::RepositoryState,
    resource::{self, ResourceSchema, Valor},
    session::{self, SesionUsuario},
    views::{self, Views},
};
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use std::collections::HashMap;
use tower_sessions::Session;

/// Every handler resolves to either a rendered view or a plain-text status
/// response, so they all share this result shape. The error side carries the
/// status code and the exact message body the route emits.
type RespuestaVista = Result<Html<String>, (StatusCode, String)>;

fn error_500(mensaje: String) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, mensaje)
}

/// Capitalizes the first letter of a resource noun for the 404 messages
/// ("usuario" -> "Usuario no encontrado.").
fn capitalizar(palabra: &str) -> String {
    let mut letras = palabra.chars();
    match letras.next() {
        Some(primera) => primera.to_uppercase().collect::<String>() + letras.as_str(),
        None => String::new(),
    }
}

// --- Page Rendering ---

/// inicio
///
/// GET / — the landing view. Anonymous requests see the sign-in prompt in
/// place of the user's name.
pub async fn inicio(sesion: SesionUsuario, State(state): State<AppState>) -> RespuestaVista {
    let mut contexto = views::contexto_sesion(&sesion);
    if !sesion.loggedin {
        contexto.insert("name", "Debe iniciar sesión");
    }
    state.views.render("index.html", &contexto)
}

/// GET /login — the login form. Renders only, so it extracts the view
/// renderer sub-state rather than the whole AppState.
pub async fn pagina_login(sesion: SesionUsuario, State(vistas): State<Views>) -> RespuestaVista {
    vistas.render("login.html", &views::contexto_sesion(&sesion))
}

/// GET /registro — the registration form.
pub async fn pagina_registro(
    sesion: SesionUsuario,
    State(vistas): State<Views>,
) -> RespuestaVista {
    vistas.render("register.html", &views::contexto_sesion(&sesion))
}

/// panel_admin
///
/// GET /admin — the dashboard. The user listing is fetched only for an
/// authenticated session; anonymous requests render the private-area
/// placeholder without touching the data store. A fetch failure is surfaced
/// as a controlled 500, the same shape as the list routes.
pub async fn panel_admin(sesion: SesionUsuario, State(state): State<AppState>) -> RespuestaVista {
    if !sesion.loggedin {
        let mut contexto = views::contexto_sesion(&sesion);
        contexto.insert("name", views::AREA_PRIVADA);
        return state.views.render("admin.html", &contexto);
    }

    let filas = state
        .repo
        .listar(&resource::USUARIOS)
        .await
        .map_err(|_| error_500("Error al obtener usuarios.".to_string()))?;

    let mut contexto = views::contexto_sesion(&sesion);
    contexto.insert("results", &filas);
    state.views.render("admin.html", &contexto)
}

// --- Credentials ---

/// registrar
///
/// POST /register — self-service registration. Validation and data-store
/// failures render the register view again with an error alert (HTTP 200, as
/// the form flow expects); success renders a transient success popup. The
/// session is never touched here.
pub async fn registrar(
    State(state): State<AppState>,
    Form(form): Form<RegistroForm>,
) -> RespuestaVista {
    let render_alerta = |alerta: Alerta| {
        let mut contexto = views::contexto_sesion(&SesionUsuario::anonima());
        views::con_alerta(&mut contexto, &alerta);
        state.views.render("register.html", &contexto)
    };

    if form.nombre.is_empty()
        || form.apellido.is_empty()
        || form.email.is_empty()
        || form.telefono.is_empty()
        || form.rol_id.is_empty()
        || form.password.is_empty()
    {
        return render_alerta(Alerta::error("Todos los campos son obligatorios", "registro"));
    }

    // Total mapping: "admin" -> 1, anything else -> 2.
    let rol = Rol::desde_formulario(&form.rol_id);

    let hash = match password::hash(&form.password).await {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("register hash failed: {}", e);
            return render_alerta(Alerta::error("Ocurrió un error en el servidor", "registro"));
        }
    };

    let valores = vec![
        ("nombre", Valor::Texto(form.nombre)),
        ("apellido", Valor::Texto(form.apellido)),
        ("email", Valor::Texto(form.email)),
        ("telefono", Valor::Texto(form.telefono)),
        ("rol_id", Valor::Entero(rol.id())),
        ("password", Valor::Texto(hash)),
    ];

    match state.repo.insertar(&resource::USUARIOS, &valores).await {
        Ok(()) => render_alerta(Alerta::exito("Registro", "¡Registro exitoso!", "")),
        Err(e) => {
            tracing::error!("register insert failed: {:?}", e);
            render_alerta(Alerta::error("Error al registrar usuario", "registro"))
        }
    }
}

/// autenticar
///
/// POST /auth — the credential check. An unknown email and a wrong password
/// produce the identical error alert, so responses never reveal whether an
/// account exists. On success the session is established with the user's
/// name and role and the login view renders a success popup whose `ruta`
/// points at the dashboard.
pub async fn autenticar(
    session: Session,
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> RespuestaVista {
    let render_alerta = |alerta: Alerta| {
        let mut contexto = views::contexto_sesion(&SesionUsuario::anonima());
        views::con_alerta(&mut contexto, &alerta);
        state.views.render("login.html", &contexto)
    };

    if form.email.is_empty() || form.pass.is_empty() {
        return render_alerta(Alerta::advertencia(
            "Ingrese el usuario y la contraseña",
            "login",
        ));
    }

    // A lookup failure degrades to the same generic credential error: the
    // login form never exposes data-store state.
    let usuario = match state.repo.buscar_usuario_por_email(&form.email).await {
        Ok(usuario) => usuario,
        Err(e) => {
            tracing::error!("auth lookup failed: {:?}", e);
            None
        }
    };

    let valido = match &usuario {
        Some(usuario) => match password::verificar(&form.pass, &usuario.password).await {
            Ok(coincide) => coincide,
            Err(e) => {
                tracing::error!("auth verify failed: {}", e);
                false
            }
        },
        None => false,
    };

    let Some(usuario) = usuario.filter(|_| valido) else {
        return render_alerta(Alerta::error("Usuario y/o contraseña erróneo", "login"));
    };

    if let Err(e) = session::iniciar(&session, &usuario.nombre, usuario.rol_id).await {
        tracing::error!("session write failed: {:?}", e);
        return Err(error_500("Ocurrió un error en el servidor.".to_string()));
    }

    render_alerta(Alerta::exito(
        "Conexión exitosa",
        "¡Inicio de sesión exitoso!",
        "admin",
    ))
}

/// GET /logout — destroys the session and returns to the landing page. A
/// store failure is logged but the redirect happens regardless; the cookie is
/// gone either way.
pub async fn cerrar_sesion(session: Session) -> Redirect {
    if let Err(e) = session::cerrar(&session).await {
        tracing::error!("session destroy failed: {:?}", e);
    }
    Redirect::to("/")
}

// --- Generic Resource CRUD ---
//
// One handler set serves usuarios, profesionales and proveedores; the
// `&'static ResourceSchema` argument (closed over at route registration) is
// the only thing that varies.

/// listar
///
/// GET /{tabla} — renders all rows for an authenticated session. Anonymous
/// requests get the private-area placeholder and the data store is never
/// queried.
pub async fn listar(
    schema: &'static ResourceSchema,
    sesion: SesionUsuario,
    State(state): State<AppState>,
) -> RespuestaVista {
    if !sesion.loggedin {
        let mut contexto = views::contexto_sesion(&sesion);
        contexto.insert("name", views::AREA_PRIVADA);
        contexto.insert("tabla", schema.table);
        return state.views.render("lista.html", &contexto);
    }

    let filas = state
        .repo
        .listar(schema)
        .await
        .map_err(|_| error_500(format!("Error al obtener {}.", schema.table)))?;

    state
        .views
        .render("lista.html", &views::contexto_lista(&sesion, schema, &filas))
}

/// crear
///
/// POST /{tabla} — validates the submitted fields, hashes the password first
/// for credential-bearing schemas, inserts, and redirects back to the list.
/// Missing or non-numeric fields are the caller's fault (400); a data-store
/// failure is a 500.
pub async fn crear(
    schema: &'static ResourceSchema,
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, (StatusCode, String)> {
    let mut valores = resource::valores_desde_formulario(schema, &form)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    if let Some(columna) = schema.password_field {
        let plano = form.get(columna).map(String::as_str).unwrap_or("");
        if plano.is_empty() {
            return Err((
                StatusCode::BAD_REQUEST,
                "Todos los campos son obligatorios.".to_string(),
            ));
        }
        let hash = password::hash(plano).await.map_err(|e| {
            tracing::error!("create hash failed: {}", e);
            error_500("Ocurrió un error en el servidor.".to_string())
        })?;
        valores.push((columna, Valor::Texto(hash)));
    }

    state
        .repo
        .insertar(schema, &valores)
        .await
        .map_err(|_| error_500(format!("Error al registrar el {}.", schema.singular)))?;

    Ok(Redirect::to(&format!("/{}", schema.table)))
}

/// cargar_edicion
///
/// GET /{tabla}/edit/{id} — loads the row and renders the pre-filled edit
/// form. A missing id is a plain-text 404.
pub async fn cargar_edicion(
    schema: &'static ResourceSchema,
    sesion: SesionUsuario,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> RespuestaVista {
    let registro = state
        .repo
        .buscar_por_id(schema, id)
        .await
        .map_err(|_| error_500(format!("Error al obtener {}.", schema.table)))?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("{} no encontrado.", capitalizar(schema.singular)),
            )
        })?;

    state.views.render(
        "editar.html",
        &views::contexto_edicion(&sesion, schema, &registro),
    )
}

/// actualizar
///
/// POST /{tabla}/edit/{id} — rebuilds the column set from the submitted
/// fields and updates by id. For credential-bearing schemas the password
/// column is included only when a new non-empty value was submitted, so an
/// untouched password input leaves the stored hash exactly as it was. There
/// is no existence pre-check: updating a missing id affects zero rows and
/// still redirects.
pub async fn actualizar(
    schema: &'static ResourceSchema,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, (StatusCode, String)> {
    let mut valores = resource::valores_desde_formulario(schema, &form)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    if let Some(columna) = schema.password_field {
        let plano = form.get(columna).map(String::as_str).unwrap_or("");
        if !plano.is_empty() {
            let hash = password::hash(plano).await.map_err(|e| {
                tracing::error!("update hash failed: {}", e);
                error_500("Ocurrió un error en el servidor.".to_string())
            })?;
            valores.push((columna, Valor::Texto(hash)));
        }
    }

    state
        .repo
        .actualizar(schema, id, &valores)
        .await
        .map_err(|_| error_500(format!("Error al actualizar el {}.", schema.singular)))?;

    Ok(Redirect::to(&format!("/{}", schema.table)))
}

/// eliminar
///
/// POST /{tabla}/delete/{id} — deletes by id and redirects to the list.
/// Idempotent: deleting an id that no longer exists still redirects. Nothing
/// renders here, so only the repository sub-state is extracted.
pub async fn eliminar(
    schema: &'static ResourceSchema,
    State(repo): State<RepositoryState>,
    Path(id): Path<i64>,
) -> Result<Redirect, (StatusCode, String)> {
    repo.eliminar(schema, id)
        .await
        .map_err(|_| error_500(format!("Error al eliminar el {}.", schema.singular)))?;

    Ok(Redirect::to(&format!("/{}", schema.table)))
}
