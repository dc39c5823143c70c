use crate::models::Usuario;
use crate::resource::{Kind, ResourceSchema, Valor};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow, query_builder::QueryBuilder};
use std::sync::Arc;

/// Record
///
/// One resource row in the shape the views consume: an ordered JSON object of
/// `id` plus the schema's editable columns. The password column is never part
/// of a `Record` — stored hashes stay inside the repository boundary.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// RepoError
///
/// Failure surface of the persistence layer. Handlers map this to their own
/// route-specific response shape (500 text on the CRUD routes, a rendered
/// alert on the credential routes).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("data store unavailable")]
    Unavailable,
}

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the core
/// of the Repository Abstraction pattern, allowing the handlers to interact with
/// the data layer without knowing the specific implementation (Postgres, in-memory).
///
/// The five generic operations are parameterized by a `ResourceSchema`, so one
/// implementation serves all three CRUD surfaces. The single typed lookup,
/// `buscar_usuario_por_email`, exists because the credential check needs the
/// stored hash and role as a `Usuario`, not a view-shaped record.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    /// All rows of the resource, id ascending, without the password column.
    async fn listar(&self, schema: &'static ResourceSchema) -> Result<Vec<Record>, RepoError>;

    /// One row by id, or None. Used by the edit-load screen.
    async fn buscar_por_id(
        &self,
        schema: &'static ResourceSchema,
        id: i64,
    ) -> Result<Option<Record>, RepoError>;

    /// Inserts a new row from the ordered column values.
    async fn insertar(
        &self,
        schema: &'static ResourceSchema,
        valores: &[(&'static str, Valor)],
    ) -> Result<(), RepoError>;

    /// Updates the given columns by id. Columns absent from `valores` are left
    /// untouched — this is how an edit without a new password preserves the
    /// stored hash. Zero affected rows is not an error (no existence pre-check).
    async fn actualizar(
        &self,
        schema: &'static ResourceSchema,
        id: i64,
        valores: &[(&'static str, Valor)],
    ) -> Result<(), RepoError>;

    /// Deletes by id. Idempotent: deleting a missing id succeeds.
    async fn eliminar(&self, schema: &'static ResourceSchema, id: i64) -> Result<(), RepoError>;

    /// Full credential row for the `/auth` lookup.
    async fn buscar_usuario_por_email(&self, email: &str) -> Result<Option<Usuario>, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a fetched row to the view-shaped `Record`, reading each column with the
/// type its schema kind declares. The password column is never selected, so it
/// can never leak into a record.
fn registro_desde_fila(
    schema: &'static ResourceSchema,
    fila: &PgRow,
) -> Result<Record, sqlx::Error> {
    let mut registro = Record::new();
    registro.insert("id".to_string(), fila.try_get::<i64, _>("id")?.into());
    for campo in schema.fields {
        let valor = match campo.kind {
            Kind::Text => fila.try_get::<String, _>(campo.name)?.into(),
            Kind::Integer => fila.try_get::<i32, _>(campo.name)?.into(),
        };
        registro.insert(campo.name.to_string(), valor);
    }
    Ok(registro)
}

/// Appends a typed bind for one column value.
fn bind_valor<'a>(builder: &mut QueryBuilder<'a, sqlx::Postgres>, valor: &'a Valor) {
    match valor {
        Valor::Texto(s) => builder.push_bind(s.as_str()),
        Valor::Entero(n) => builder.push_bind(*n),
    };
}

#[async_trait]
impl Repository for PostgresRepository {
    /// listar
    ///
    /// Selects id plus the schema's columns, ordered by id, using QueryBuilder
    /// for the dynamic column list. Table and column names come from the static
    /// schemas, never from request input; all values are bound parameters.
    async fn listar(&self, schema: &'static ResourceSchema) -> Result<Vec<Record>, RepoError> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("SELECT id");
        for campo in schema.fields {
            builder.push(", ");
            builder.push(campo.name);
        }
        builder.push(" FROM ");
        builder.push(schema.table);
        builder.push(" ORDER BY id ASC");

        let filas = builder.build().fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("listar {} error: {:?}", schema.table, e);
            RepoError::from(e)
        })?;

        filas
            .iter()
            .map(|fila| registro_desde_fila(schema, fila).map_err(RepoError::from))
            .collect()
    }

    /// buscar_por_id
    ///
    /// Same projection as `listar`, constrained to one id.
    async fn buscar_por_id(
        &self,
        schema: &'static ResourceSchema,
        id: i64,
    ) -> Result<Option<Record>, RepoError> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("SELECT id");
        for campo in schema.fields {
            builder.push(", ");
            builder.push(campo.name);
        }
        builder.push(" FROM ");
        builder.push(schema.table);
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let fila = builder.build().fetch_optional(&self.pool).await.map_err(|e| {
            tracing::error!("buscar_por_id {} error: {:?}", schema.table, e);
            RepoError::from(e)
        })?;

        match fila {
            Some(fila) => Ok(Some(registro_desde_fila(schema, &fila)?)),
            None => Ok(None),
        }
    }

    /// insertar
    ///
    /// `INSERT INTO t (a, b, ...) VALUES ($1, $2, ...)` assembled from the
    /// ordered column values. The id is assigned by the database sequence.
    async fn insertar(
        &self,
        schema: &'static ResourceSchema,
        valores: &[(&'static str, Valor)],
    ) -> Result<(), RepoError> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("INSERT INTO ");
        builder.push(schema.table);
        builder.push(" (");
        let mut columnas = builder.separated(", ");
        for (columna, _) in valores {
            columnas.push(*columna);
        }
        builder.push(") VALUES (");
        let mut primera = true;
        for (_, valor) in valores {
            if !primera {
                builder.push(", ");
            }
            primera = false;
            bind_valor(&mut builder, valor);
        }
        builder.push(")");

        builder.build().execute(&self.pool).await.map_err(|e| {
            tracing::error!("insertar {} error: {:?}", schema.table, e);
            RepoError::from(e)
        })?;
        Ok(())
    }

    /// actualizar
    ///
    /// `UPDATE t SET a = $1, ... WHERE id = $n`. Only the supplied columns are
    /// written; zero affected rows is reported as success.
    async fn actualizar(
        &self,
        schema: &'static ResourceSchema,
        id: i64,
        valores: &[(&'static str, Valor)],
    ) -> Result<(), RepoError> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("UPDATE ");
        builder.push(schema.table);
        builder.push(" SET ");
        let mut primera = true;
        for (columna, valor) in valores {
            if !primera {
                builder.push(", ");
            }
            primera = false;
            builder.push(*columna);
            builder.push(" = ");
            bind_valor(&mut builder, valor);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        builder.build().execute(&self.pool).await.map_err(|e| {
            tracing::error!("actualizar {} error: {:?}", schema.table, e);
            RepoError::from(e)
        })?;
        Ok(())
    }

    /// eliminar
    ///
    /// `DELETE FROM t WHERE id = $1`. Idempotent by construction.
    async fn eliminar(&self, schema: &'static ResourceSchema, id: i64) -> Result<(), RepoError> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("DELETE FROM ");
        builder.push(schema.table);
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        builder.build().execute(&self.pool).await.map_err(|e| {
            tracing::error!("eliminar {} error: {:?}", schema.table, e);
            RepoError::from(e)
        })?;
        Ok(())
    }

    /// buscar_usuario_por_email
    ///
    /// Typed credential lookup. The only query that reads the password column.
    async fn buscar_usuario_por_email(&self, email: &str) -> Result<Option<Usuario>, RepoError> {
        sqlx::query_as::<_, Usuario>(
            "SELECT id, nombre, apellido, email, telefono, rol_id, password \
             FROM usuarios WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("buscar_usuario_por_email error: {:?}", e);
            RepoError::from(e)
        })
    }
}

// --- In-Memory Implementation (Tests) ---

/// MemoryRepository
///
/// An in-memory implementation of `Repository` used exclusively for unit and
/// integration testing. Rows live in per-table vectors behind a mutex; ids are
/// assigned from a shared counter. The `should_fail` flag turns every operation
/// into a simulated data-store failure so the per-route error shapes can be
/// exercised without a database.
pub struct MemoryRepository {
    tablas: std::sync::Mutex<std::collections::HashMap<&'static str, Vec<FilaMemoria>>>,
    siguiente_id: std::sync::atomic::AtomicI64,
    /// When true, all operations return `RepoError::Unavailable`.
    pub should_fail: bool,
}

/// One stored row: the view-shaped record plus the password column, which is
/// kept aside so reads mirror the Postgres projection (no hash in records).
#[derive(Debug, Clone)]
struct FilaMemoria {
    registro: Record,
    password: Option<String>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            tablas: std::sync::Mutex::new(std::collections::HashMap::new()),
            siguiente_id: std::sync::atomic::AtomicI64::new(1),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    fn verificar_disponible(&self) -> Result<(), RepoError> {
        if self.should_fail {
            return Err(RepoError::Unavailable);
        }
        Ok(())
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn listar(&self, schema: &'static ResourceSchema) -> Result<Vec<Record>, RepoError> {
        self.verificar_disponible()?;
        let tablas = self.tablas.lock().expect("memory repository poisoned");
        Ok(tablas
            .get(schema.table)
            .map(|filas| filas.iter().map(|f| f.registro.clone()).collect())
            .unwrap_or_default())
    }

    async fn buscar_por_id(
        &self,
        schema: &'static ResourceSchema,
        id: i64,
    ) -> Result<Option<Record>, RepoError> {
        self.verificar_disponible()?;
        let tablas = self.tablas.lock().expect("memory repository poisoned");
        Ok(tablas.get(schema.table).and_then(|filas| {
            filas
                .iter()
                .find(|f| f.registro.get("id").and_then(|v| v.as_i64()) == Some(id))
                .map(|f| f.registro.clone())
        }))
    }

    async fn insertar(
        &self,
        schema: &'static ResourceSchema,
        valores: &[(&'static str, Valor)],
    ) -> Result<(), RepoError> {
        self.verificar_disponible()?;
        let id = self
            .siguiente_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let mut registro = Record::new();
        registro.insert("id".to_string(), id.into());
        let mut password = None;
        for (columna, valor) in valores {
            if Some(*columna) == schema.password_field {
                if let Valor::Texto(hash) = valor {
                    password = Some(hash.clone());
                }
                continue;
            }
            let valor = match valor {
                Valor::Texto(s) => serde_json::Value::from(s.clone()),
                Valor::Entero(n) => serde_json::Value::from(*n),
            };
            registro.insert(columna.to_string(), valor);
        }

        let mut tablas = self.tablas.lock().expect("memory repository poisoned");
        tablas
            .entry(schema.table)
            .or_default()
            .push(FilaMemoria { registro, password });
        Ok(())
    }

    async fn actualizar(
        &self,
        schema: &'static ResourceSchema,
        id: i64,
        valores: &[(&'static str, Valor)],
    ) -> Result<(), RepoError> {
        self.verificar_disponible()?;
        let mut tablas = self.tablas.lock().expect("memory repository poisoned");
        if let Some(filas) = tablas.get_mut(schema.table) {
            if let Some(fila) = filas
                .iter_mut()
                .find(|f| f.registro.get("id").and_then(|v| v.as_i64()) == Some(id))
            {
                for (columna, valor) in valores {
                    if Some(*columna) == schema.password_field {
                        if let Valor::Texto(hash) = valor {
                            fila.password = Some(hash.clone());
                        }
                        continue;
                    }
                    let valor = match valor {
                        Valor::Texto(s) => serde_json::Value::from(s.clone()),
                        Valor::Entero(n) => serde_json::Value::from(*n),
                    };
                    fila.registro.insert(columna.to_string(), valor);
                }
            }
        }
        // Missing id: zero rows affected, still success.
        Ok(())
    }

    async fn eliminar(&self, schema: &'static ResourceSchema, id: i64) -> Result<(), RepoError> {
        self.verificar_disponible()?;
        let mut tablas = self.tablas.lock().expect("memory repository poisoned");
        if let Some(filas) = tablas.get_mut(schema.table) {
            filas.retain(|f| f.registro.get("id").and_then(|v| v.as_i64()) != Some(id));
        }
        Ok(())
    }

    async fn buscar_usuario_por_email(&self, email: &str) -> Result<Option<Usuario>, RepoError> {
        self.verificar_disponible()?;
        let tablas = self.tablas.lock().expect("memory repository poisoned");
        let Some(filas) = tablas.get(crate::resource::USUARIOS.table) else {
            return Ok(None);
        };
        Ok(filas
            .iter()
            .find(|f| f.registro.get("email").and_then(|v| v.as_str()) == Some(email))
            .map(|f| Usuario {
                id: f.registro.get("id").and_then(|v| v.as_i64()).unwrap_or(0),
                nombre: texto(&f.registro, "nombre"),
                apellido: texto(&f.registro, "apellido"),
                email: texto(&f.registro, "email"),
                telefono: texto(&f.registro, "telefono"),
                rol_id: f
                    .registro
                    .get("rol_id")
                    .and_then(|v| v.as_i64())
                    .unwrap_or(0) as i32,
                password: f.password.clone().unwrap_or_default(),
            }))
    }
}

fn texto(registro: &Record, clave: &str) -> String {
    registro
        .get(clave)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
