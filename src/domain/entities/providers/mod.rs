//! 연결된 프로바이더 엔티티

pub mod linked_provider;
pub mod provider_data;

pub use linked_provider::*;
pub use provider_data::*;
