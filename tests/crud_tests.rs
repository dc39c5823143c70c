use gestion_portal::{
    AppConfig, AppState, MemoryRepository, Views, create_router,
    password,
    repository::Repository,
    resource::{PROFESIONALES, PROVEEDORES, USUARIOS, Valor},
};
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub repo: Arc<MemoryRepository>,
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new());

    let state = AppState {
        repo: repo.clone(),
        views: Views::new(),
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, repo }
}

// Redirects are assertions here, so this client never follows them.
fn cliente_sin_redirecciones() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

// Seeds a user and logs the client in through /auth.
async fn iniciar_sesion(app: &TestApp, client: &reqwest::Client) {
    let hash = password::hash("pw123").await.unwrap();
    app.repo
        .insertar(
            &USUARIOS,
            &[
                ("nombre", Valor::Texto("Ana".to_string())),
                ("apellido", Valor::Texto("Lopez".to_string())),
                ("email", Valor::Texto("a@x.com".to_string())),
                ("telefono", Valor::Texto("555".to_string())),
                ("rol_id", Valor::Entero(1)),
                ("password", Valor::Texto(hash)),
            ],
        )
        .await
        .unwrap();

    let response = client
        .post(format!("{}/auth", app.address))
        .form(&[("email", "a@x.com"), ("pass", "pw123")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ciclo_crud_profesionales() {
    let app = spawn_app().await;
    let client = cliente_sin_redirecciones();
    iniciar_sesion(&app, &client).await;

    // Create: 303 back to the list.
    let response = client
        .post(format!("{}/profesionales", app.address))
        .form(&[
            ("nombre", "Eva"),
            ("apellido", "Gil"),
            ("telefono", "111"),
            ("email", "eva@x.com"),
            ("categoria", "electricidad"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()["location"].to_str().unwrap(),
        "/profesionales"
    );

    let filas = app.repo.listar(&PROFESIONALES).await.unwrap();
    assert_eq!(filas.len(), 1);
    let id = filas[0]["id"].as_i64().unwrap();

    // List renders the new row.
    let lista = client
        .get(format!("{}/profesionales", app.address))
        .send()
        .await
        .unwrap();
    let cuerpo = lista.text().await.unwrap();
    assert!(cuerpo.contains("Eva"));
    assert!(cuerpo.contains("electricidad"));

    // Edit-load renders the pre-filled form.
    let edicion = client
        .get(format!("{}/profesionales/edit/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(edicion.status(), StatusCode::OK);
    assert!(edicion.text().await.unwrap().contains("eva@x.com"));

    // Edit-submit: 303 back to the list, row updated.
    let response = client
        .post(format!("{}/profesionales/edit/{}", app.address, id))
        .form(&[
            ("nombre", "Eva"),
            ("apellido", "Gil"),
            ("telefono", "222"),
            ("email", "eva@x.com"),
            ("categoria", "fontanería"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let filas = app.repo.listar(&PROFESIONALES).await.unwrap();
    assert_eq!(filas[0]["telefono"], "222");
    assert_eq!(filas[0]["categoria"], "fontanería");

    // Delete: 303, row gone.
    let response = client
        .post(format!("{}/profesionales/delete/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.repo.listar(&PROFESIONALES).await.unwrap().is_empty());

    // Deleting the same id again still redirects (idempotent, no 404).
    let response = client
        .post(format!("{}/profesionales/delete/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_crear_con_campos_incompletos_400() {
    let app = spawn_app().await;
    let client = cliente_sin_redirecciones();

    let response = client
        .post(format!("{}/proveedores", app.address))
        .form(&[("nombre", "Proveedora SA"), ("telefono", "111")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text().await.unwrap(),
        "Todos los campos son obligatorios."
    );
    assert!(app.repo.listar(&PROVEEDORES).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_edicion_de_id_inexistente_404() {
    let app = spawn_app().await;
    let client = cliente_sin_redirecciones();
    iniciar_sesion(&app, &client).await;

    let response = client
        .get(format!("{}/proveedores/edit/9999", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.text().await.unwrap(), "Proveedor no encontrado.");
}

#[tokio::test]
async fn test_actualizar_id_inexistente_redirige() {
    // No existence pre-check: zero rows affected, still a redirect.
    let app = spawn_app().await;
    let client = cliente_sin_redirecciones();

    let response = client
        .post(format!("{}/proveedores/edit/9999", app.address))
        .form(&[
            ("nombre", "Proveedora SA"),
            ("telefono", "111"),
            ("web", "https://ejemplo.com"),
            ("email", "p@x.com"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_lista_sin_sesion_renderiza_placeholder() {
    let app = spawn_app().await;
    let client = cliente_sin_redirecciones();

    let response = client
        .get(format!("{}/usuarios", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Área privada"));
}

#[tokio::test]
async fn test_delete_por_get_no_permitido() {
    // Delete is POST-only across all three resources.
    let app = spawn_app().await;
    let client = cliente_sin_redirecciones();

    let response = client
        .get(format!("{}/usuarios/delete/1", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_crear_usuario_via_crud_hashea_password() {
    let app = spawn_app().await;
    let client = cliente_sin_redirecciones();
    iniciar_sesion(&app, &client).await;

    let response = client
        .post(format!("{}/usuarios", app.address))
        .form(&[
            ("nombre", "Luis"),
            ("apellido", "Mora"),
            ("email", "luis@x.com"),
            ("telefono", "777"),
            ("rol_id", "2"),
            ("password", "secreta"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let usuario = app
        .repo
        .buscar_usuario_por_email("luis@x.com")
        .await
        .unwrap()
        .expect("created row");
    assert_ne!(usuario.password, "secreta");
    assert!(
        password::verificar("secreta", &usuario.password)
            .await
            .unwrap()
    );

    // The rendered list never carries the hash.
    let lista = client
        .get(format!("{}/usuarios", app.address))
        .send()
        .await
        .unwrap();
    let cuerpo = lista.text().await.unwrap();
    assert!(cuerpo.contains("luis@x.com"));
    assert!(!cuerpo.contains(&usuario.password));
}

#[tokio::test]
async fn test_editar_usuario_via_http_conserva_password() {
    let app = spawn_app().await;
    let client = cliente_sin_redirecciones();
    iniciar_sesion(&app, &client).await;

    let hash_antes = app
        .repo
        .buscar_usuario_por_email("a@x.com")
        .await
        .unwrap()
        .unwrap()
        .password;
    let id = app.repo.listar(&USUARIOS).await.unwrap()[0]["id"]
        .as_i64()
        .unwrap();

    // Password input submitted empty, as the browser form does.
    let response = client
        .post(format!("{}/usuarios/edit/{}", app.address, id))
        .form(&[
            ("nombre", "Ana"),
            ("apellido", "Lopez"),
            ("email", "a@x.com"),
            ("telefono", "999"),
            ("rol_id", "1"),
            ("password", ""),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let usuario = app
        .repo
        .buscar_usuario_por_email("a@x.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(usuario.password, hash_antes);
    assert_eq!(usuario.telefono, "999");
}
