//! # Data Transfer Objects
//!
//! HTTP 경계에서 주고받는 요청/응답 형태를 정의합니다.
//! 입력 검증은 `validator` 크레이트로 수행합니다.

pub mod auth;
pub mod response;
pub mod workspaces;

pub use auth::*;
pub use response::*;
pub use workspaces::*;
