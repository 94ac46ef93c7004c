//! 공통 응답 봉투
//!
//! 모든 JSON 엔드포인트는 `{ "result", "error", "code" }` 형태로 응답합니다.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: T,
    pub error: String,
    pub code: u16,
}

impl<T> ApiResponse<T> {
    pub fn ok(result: T) -> Self {
        Self::with_code(result, 200)
    }

    pub fn created(result: T) -> Self {
        Self::with_code(result, 201)
    }

    pub fn with_code(result: T, code: u16) -> Self {
        Self {
            result,
            error: String::new(),
            code,
        }
    }
}
