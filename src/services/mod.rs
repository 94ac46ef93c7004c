//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 서비스는 리포지토리와 외부 API 클라이언트를 `Arc<dyn Trait>`로 주입받습니다.
//! 조립은 [`crate::core::registry`]에서 한 번만 수행합니다.
//!
//! # Features
//!
//! - 프로바이더 로그인/콜백/로그아웃과 세션 토큰 (`auth`)
//! - 프로필, 상태, GDPR 내보내기, 계정 삭제 (`accounts`)
//! - 워크스페이스와 멤버 관리 (`workspaces`)
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::accounts::AccountService;
//!
//! let service = AccountService::new(providers, profiles, accounts, workspaces, bots, discord, cdn_base);
//! let status = service.status(&user.user_id).await?;
//! ```

pub mod accounts;
pub mod auth;
pub mod workspaces;
