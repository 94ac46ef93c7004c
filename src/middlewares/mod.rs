//! 미들웨어 모듈
//!
//! ActixWeb 요청 처리 파이프라인에서 사용되는 미들웨어들을 제공합니다.
//!
//! # 제공 미들웨어
//!
//! ### 1. 인증 미들웨어 (AuthMiddleware)
//! - `Authorization: Bearer` 헤더 또는 `token` 쿠키에서 세션 토큰 추출
//! - 검증된 앵커 아이덴티티(`AuthenticatedUser`)를 request extension에 저장
//! - 선택적/강제 인증 모드 지원
//!
//! ### 2. 컨텍스트 레이어
//! - `load_profile`: 인증된 사용자의 프로필을 추가
//! - `load_workspace`: 경로의 워크스페이스와 요청자의 멤버십을 추가
//! - `load_bot`: 워크스페이스의 봇을 추가 (없으면 404)
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! use actix_web::middleware::from_fn;
//! use crate::middlewares::{load_profile, load_workspace, AuthMiddleware};
//!
//! web::scope("/workspaces")
//!     .wrap(from_fn(load_profile))        // 두 번째로 실행
//!     .wrap(AuthMiddleware::required())   // 먼저 실행
//!     .service(
//!         web::scope("/{workspace_id}")
//!             .wrap(from_fn(load_workspace))
//!     )
//! ```

pub mod auth_middleware;
mod auth_inner;
pub mod context_layers;

pub use auth_middleware::{session_credential, AuthMiddleware};
pub use context_layers::{load_bot, load_profile, load_workspace};
