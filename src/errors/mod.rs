//! 에러 타입 모듈
//!
//! 전역 에러 타입 [`AppError`]와 `AppResult`, `ErrorContext`를 제공합니다.
//! 리다이렉트 여부에 따른 에러 보고는 `handlers::responder`가 담당합니다.

pub mod errors;

pub use errors::*;
