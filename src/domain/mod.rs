//! Domain layer: core entities and business rules.

pub mod guard;
pub mod route;
pub mod session;
pub mod transcript;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
