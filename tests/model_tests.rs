use gestion_portal::models::{Alerta, Rol};
use gestion_portal::resource::{
    self, FormError, Kind, PROFESIONALES, PROVEEDORES, USUARIOS, Valor,
};
use std::collections::HashMap;

// --- Role Mapping ---

#[test]
fn test_rol_admin_mapea_a_1() {
    let rol = Rol::desde_formulario("admin");
    assert_eq!(rol, Rol::Admin);
    assert_eq!(rol.id(), 1);
}

#[test]
fn test_rol_cualquier_otro_mapea_a_2() {
    // The mapping is total: any non-"admin" string, including near-misses and
    // the empty string, resolves to Otro. There is no rejection branch.
    for valor in ["usuario", "Admin", "ADMIN", "administrador", ""] {
        let rol = Rol::desde_formulario(valor);
        assert_eq!(rol, Rol::Otro, "'{valor}' should map to Otro");
        assert_eq!(rol.id(), 2);
    }
}

// --- Alert Metadata Shape ---

#[test]
fn test_alerta_serializa_con_claves_camel_case() {
    // The popup script reads these exact keys from the template context.
    let alerta = Alerta::error("Todos los campos son obligatorios", "registro");
    let json = serde_json::to_value(&alerta).unwrap();

    assert_eq!(json["alert"], true);
    assert_eq!(json["alertTitle"], "Error");
    assert_eq!(json["alertMessage"], "Todos los campos son obligatorios");
    assert_eq!(json["alertIcon"], "error");
    assert_eq!(json["showConfirmButton"], true);
    assert_eq!(json["timer"], serde_json::Value::Null);
    assert_eq!(json["ruta"], "registro");
}

#[test]
fn test_alerta_exito_auto_descarta() {
    let alerta = Alerta::exito("Registro", "¡Registro exitoso!", "");
    assert_eq!(alerta.alert_icon, "success");
    assert!(!alerta.show_confirm_button);
    assert_eq!(alerta.timer, Some(1500));
}

#[test]
fn test_alerta_advertencia() {
    let alerta = Alerta::advertencia("Ingrese el usuario y la contraseña", "login");
    assert_eq!(alerta.alert_title, "Advertencia");
    assert_eq!(alerta.alert_icon, "warning");
    assert!(alerta.show_confirm_button);
}

// --- Resource Schemas ---

#[test]
fn test_orden_de_campos_usuarios() {
    let nombres = resource::nombres_de_campos(&USUARIOS);
    assert_eq!(
        nombres,
        vec!["nombre", "apellido", "email", "telefono", "rol_id"]
    );
    assert_eq!(USUARIOS.password_field, Some("password"));
    // rol_id is the only non-text column across all three schemas.
    assert_eq!(USUARIOS.fields[4].kind, Kind::Integer);
}

#[test]
fn test_orden_de_campos_profesionales() {
    let nombres = resource::nombres_de_campos(&PROFESIONALES);
    assert_eq!(
        nombres,
        vec!["nombre", "apellido", "telefono", "email", "categoria"]
    );
    assert_eq!(PROFESIONALES.password_field, None);
}

#[test]
fn test_orden_de_campos_proveedores() {
    let nombres = resource::nombres_de_campos(&PROVEEDORES);
    assert_eq!(nombres, vec!["nombre", "telefono", "web", "email"]);
    assert_eq!(PROVEEDORES.password_field, None);
}

// --- Form Conversion ---

fn formulario(pares: &[(&str, &str)]) -> HashMap<String, String> {
    pares
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_conversion_completa_en_orden_de_esquema() {
    let form = formulario(&[
        ("web", "https://ejemplo.com"),
        ("email", "p@x.com"),
        ("telefono", "555"),
        ("nombre", "Proveedora SA"),
    ]);
    let valores = resource::valores_desde_formulario(&PROVEEDORES, &form).unwrap();

    // Output order follows the schema, not the submitted map.
    assert_eq!(
        valores,
        vec![
            ("nombre", Valor::Texto("Proveedora SA".to_string())),
            ("telefono", Valor::Texto("555".to_string())),
            ("web", Valor::Texto("https://ejemplo.com".to_string())),
            ("email", Valor::Texto("p@x.com".to_string())),
        ]
    );
}

#[test]
fn test_conversion_campo_ausente_falla() {
    let form = formulario(&[("nombre", "X"), ("telefono", "1"), ("web", "w")]);
    let resultado = resource::valores_desde_formulario(&PROVEEDORES, &form);
    assert_eq!(resultado, Err(FormError::CampoFaltante));
}

#[test]
fn test_conversion_campo_vacio_cuenta_como_ausente() {
    // Presence rule: a field is present iff its value is a non-empty string.
    let form = formulario(&[
        ("nombre", "X"),
        ("telefono", "1"),
        ("web", ""),
        ("email", "a@b.c"),
    ]);
    let resultado = resource::valores_desde_formulario(&PROVEEDORES, &form);
    assert_eq!(resultado, Err(FormError::CampoFaltante));
}

#[test]
fn test_conversion_entero_invalido() {
    let form = formulario(&[
        ("nombre", "Ana"),
        ("apellido", "Lopez"),
        ("email", "a@x.com"),
        ("telefono", "555"),
        ("rol_id", "admin"), // the CRUD form posts the numeric id, not the role string
    ]);
    let resultado = resource::valores_desde_formulario(&USUARIOS, &form);
    assert_eq!(resultado, Err(FormError::EnteroInvalido("rol_id")));
}

#[test]
fn test_conversion_entero_valido() {
    let form = formulario(&[
        ("nombre", "Ana"),
        ("apellido", "Lopez"),
        ("email", "a@x.com"),
        ("telefono", "555"),
        ("rol_id", "2"),
    ]);
    let valores = resource::valores_desde_formulario(&USUARIOS, &form).unwrap();
    assert!(valores.contains(&("rol_id", Valor::Entero(2))));
    // The password column is never part of the generic conversion.
    assert!(valores.iter().all(|(columna, _)| *columna != "password"));
}
