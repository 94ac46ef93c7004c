//! 워크스페이스 데이터 액세스

pub mod integration_repo;
pub mod workspace_repo;

pub use integration_repo::*;
pub use workspace_repo::*;
