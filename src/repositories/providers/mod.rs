//! 연결된 프로바이더 데이터 액세스

pub mod provider_repo;

pub use provider_repo::*;
