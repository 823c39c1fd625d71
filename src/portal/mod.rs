//! Adapters for the portal's external services: the identity provider, the
//! registration record store, and the hosted completion endpoint.

mod completion;
mod http;
mod identity;
mod records;

pub use completion::GroqCompletionClient;
pub use identity::FirebaseIdentityClient;
pub use records::FirestoreTeamLookup;

/// Returns the portal module name for smoke checks.
pub fn module_name() -> &'static str {
    "portal"
}
