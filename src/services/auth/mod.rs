//! 인증 및 계정 연결 서비스 모듈
//!
//! 프로바이더별 로그인 흐름, 아이덴티티 조정, 세션 토큰 발급을 담당합니다.
//!
//! # 구성
//!
//! - [`token_service`] - HS256 세션 토큰 발급/검증
//! - [`challenge`] - Roblox 검증 문구 생성
//! - [`providers`] - Discord, LastFM, Roblox 어댑터와 디스패처
//! - [`identity_service`] - 생성/갱신 결정 (reconciliation)
//! - [`auth_service`] - 위 구성 요소를 묶는 로그인/콜백/로그아웃 흐름
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::auth::{AuthService, ProviderRequest};
//!
//! let request = ProviderRequest::new(params, anchor);
//! let result = auth_service.complete_login("discord", &request).await?;
//! if let Some(token) = result.session_token {
//!     // token 쿠키 설정
//! }
//! ```

pub mod auth_service;
pub mod challenge;
pub mod identity_service;
pub mod providers;
pub mod token_service;

pub use auth_service::*;
pub use identity_service::*;
pub use providers::{
    LoginFlow, LoginOutcome, LoginStart, LogoutOutcome, ProviderAdapter, ProviderRegistry, ProviderRequest,
};
pub use token_service::*;
