//! 워크스페이스 서비스 모듈
//!
//! 워크스페이스와 멤버, 워크스페이스 봇, 통합 기능을 다룹니다.

pub mod bot_service;
pub mod integration_service;
pub mod workspace_service;

pub use bot_service::*;
pub use integration_service::*;
pub use workspace_service::*;
