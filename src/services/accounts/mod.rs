//! 계정 관리 서비스 모듈
//!
//! 프로필 조회, 프로바이더 목록, 상태 확인, GDPR 내보내기, 계정 삭제를 제공합니다.

pub mod account_service;

pub use account_service::*;
