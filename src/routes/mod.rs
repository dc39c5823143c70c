//! Router Module Index
//!
//! Organizes the application's routing logic by function. Access gating is not
//! a router-level concern here: every view-rendering handler resolves the
//! request's `SesionUsuario` and chooses its authenticated or placeholder
//! branch itself, so the modules split by what they serve rather than by
//! privilege.

/// View-rendering page routes plus the liveness probe.
pub mod pages;

/// Credential routes: registration, login, logout.
pub mod auth;

/// The generic five-operation CRUD route set, instantiated once per resource.
pub mod resources;
