use crate::{
    AppState, handlers, repository::RepositoryState, resource::ResourceSchema,
    session::SesionUsuario,
};
use axum::{
    Router,
    extract::{Form, Path, State},
    routing::{get, post},
};
use std::collections::HashMap;

/// Resource Router Module
///
/// Instantiates the generic five-operation CRUD contract for one resource
/// schema. The closures close over the `&'static ResourceSchema` so the same
/// handler set serves usuarios, profesionales and proveedores; the router is
/// merged once per schema in `create_router`.
///
/// Method choices are normalized across all three resources: GET for reads,
/// POST for every mutation (create, edit-submit, delete).
pub fn resource_routes(schema: &'static ResourceSchema) -> Router<AppState> {
    Router::new()
        // GET /{tabla} — list; POST /{tabla} — create.
        .route(
            &format!("/{}", schema.table),
            get(move |sesion: SesionUsuario, state: State<AppState>| {
                handlers::listar(schema, sesion, state)
            })
            .post(move |state: State<AppState>, form: Form<HashMap<String, String>>| {
                handlers::crear(schema, state, form)
            }),
        )
        // GET /{tabla}/edit/{id} — pre-filled form; POST — submit the update.
        .route(
            &format!("/{}/edit/{{id}}", schema.table),
            get(
                move |sesion: SesionUsuario, state: State<AppState>, id: Path<i64>| {
                    handlers::cargar_edicion(schema, sesion, state, id)
                },
            )
            .post(
                move |state: State<AppState>, id: Path<i64>, form: Form<HashMap<String, String>>| {
                    handlers::actualizar(schema, state, id, form)
                },
            ),
        )
        // POST /{tabla}/delete/{id} — idempotent delete.
        .route(
            &format!("/{}/delete/{{id}}", schema.table),
            post(move |repo: State<RepositoryState>, id: Path<i64>| {
                handlers::eliminar(schema, repo, id)
            }),
        )
}
