//! 워크스페이스 봇 데이터 액세스

pub mod bot_repo;

pub use bot_repo::*;
