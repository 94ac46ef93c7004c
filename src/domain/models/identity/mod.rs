pub mod provider_identity;

pub use provider_identity::*;
