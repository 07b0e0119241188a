//! Router Module Index
//!
//! Splits the API by access level. Each module returns a bare router; the
//! matching gate is attached in `create_router`, so a handler's access level
//! is decided by the module it is registered in.

/// Anonymous access: catalogue reads, route planning, register/login/logout.
pub mod public;

/// Any valid bearer token (`require_auth`).
pub mod authenticated;

/// Saved routes, gated by `RoleGate` for the `admin` and `user` roles.
pub mod planner;

/// Catalogue writes, user administration and the dashboard (`RoleGate::admin_only`).
pub mod admin;
