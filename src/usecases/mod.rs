//! Use case layer: application workflows and orchestration.

pub mod bootstrap;
pub mod chat_turn;
pub mod context;
pub mod guided_auth;
pub mod logout;
pub mod navigate;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
