//! 프로필 데이터 액세스

pub mod profile_repo;

pub use profile_repo::*;
