use std::collections::HashMap;

/// Kind
///
/// The column kind of a resource field. Everything the forms submit is text;
/// integer-kind fields must parse before they are bound into a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Integer,
}

/// Field
///
/// One editable column of a resource table, in form/template order.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
}

/// ResourceSchema
///
/// Static description of one manageable record type. The three CRUD surfaces
/// (usuarios, profesionales, proveedores) share one parameterized handler set;
/// this schema is the only thing that varies between them: the table name, the
/// ordered field list, and whether the table carries a password column that
/// must be hashed before it is ever written.
///
/// The `id` column and the password column are deliberately **not** part of
/// `fields`: the id is never form-editable, and the password follows its own
/// hash-then-include rules in the handlers.
#[derive(Debug)]
pub struct ResourceSchema {
    /// Table name; doubles as the URL segment (`/{table}`).
    pub table: &'static str,
    /// Singular noun used in the plain-text error messages.
    pub singular: &'static str,
    pub fields: &'static [Field],
    /// Present only for tables whose rows carry a credential.
    pub password_field: Option<&'static str>,
}

pub static USUARIOS: ResourceSchema = ResourceSchema {
    table: "usuarios",
    singular: "usuario",
    fields: &[
        Field { name: "nombre", kind: Kind::Text },
        Field { name: "apellido", kind: Kind::Text },
        Field { name: "email", kind: Kind::Text },
        Field { name: "telefono", kind: Kind::Text },
        Field { name: "rol_id", kind: Kind::Integer },
    ],
    password_field: Some("password"),
};

pub static PROFESIONALES: ResourceSchema = ResourceSchema {
    table: "profesionales",
    singular: "profesional",
    fields: &[
        Field { name: "nombre", kind: Kind::Text },
        Field { name: "apellido", kind: Kind::Text },
        Field { name: "telefono", kind: Kind::Text },
        Field { name: "email", kind: Kind::Text },
        Field { name: "categoria", kind: Kind::Text },
    ],
    password_field: None,
};

pub static PROVEEDORES: ResourceSchema = ResourceSchema {
    table: "proveedores",
    singular: "proveedor",
    fields: &[
        Field { name: "nombre", kind: Kind::Text },
        Field { name: "telefono", kind: Kind::Text },
        Field { name: "web", kind: Kind::Text },
        Field { name: "email", kind: Kind::Text },
    ],
    password_field: None,
};

/// Valor
///
/// A single bound column value, typed per the field kind so the repository can
/// bind it as the right SQL type.
#[derive(Debug, Clone, PartialEq)]
pub enum Valor {
    Texto(String),
    Entero(i32),
}

/// FormError
///
/// Validation failures while converting a submitted form into column values.
/// Both variants are caller errors and map to HTTP 400 in the handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Todos los campos son obligatorios.")]
    CampoFaltante,
    #[error("El campo {0} debe ser numérico.")]
    EnteroInvalido(&'static str),
}

/// valores_desde_formulario
///
/// Converts the raw submitted form map into the ordered `(column, value)` list
/// the repository binds into INSERT/UPDATE statements. A field is present iff
/// its submitted value is a non-empty string (no trimming); any absent field
/// fails the whole conversion. Integer-kind fields must parse as i32.
pub fn valores_desde_formulario(
    schema: &'static ResourceSchema,
    form: &HashMap<String, String>,
) -> Result<Vec<(&'static str, Valor)>, FormError> {
    let mut valores = Vec::with_capacity(schema.fields.len());

    for campo in schema.fields {
        let crudo = form.get(campo.name).map(String::as_str).unwrap_or("");
        if crudo.is_empty() {
            return Err(FormError::CampoFaltante);
        }
        let valor = match campo.kind {
            Kind::Text => Valor::Texto(crudo.to_string()),
            Kind::Integer => Valor::Entero(
                crudo
                    .parse()
                    .map_err(|_| FormError::EnteroInvalido(campo.name))?,
            ),
        };
        valores.push((campo.name, valor));
    }

    Ok(valores)
}

/// Ordered field names, as the list and edit templates iterate them.
pub fn nombres_de_campos(schema: &'static ResourceSchema) -> Vec<&'static str> {
    schema.fields.iter().map(|f| f.name).collect()
}
