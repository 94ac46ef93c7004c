//! 계정 부가 레코드 데이터 액세스

pub mod account_repo;

pub use account_repo::*;
