//! 저장소, 외부 API, 프로바이더 어댑터, 핸들러가 공유하는 에러 타입
//!
//! `thiserror`와 `actix_web::ResponseError`를 사용하여 모든 계층의 에러를
//! 하나의 타입으로 모으고, HTTP 경계에서 상태 코드와 응답 봉투
//! `{ "result": null, "error": <메시지>, "code": <상태 코드> }`로 변환합니다.
//!
//! ## 예시
//!
//! ```rust,ignore
//! use crate::errors::{AppError, AppResult};
//!
//! async fn pending_row(code: &str) -> AppResult<LinkedProvider> {
//!     providers.find_by_challenge_code(code).await?
//!         .ok_or_else(|| AppError::NotFound("Code not found".to_string()))
//! }
//! ```
//!
//! ## 상태 코드
//!
//! | AppError | HTTP Status |
//! |----------|-------------|
//! | `ValidationError`, `ProviderError` | 400 Bad Request |
//! | `AuthenticationError` | 401 Unauthorized |
//! | `AuthorizationError` | 403 Forbidden |
//! | `NotFound` | 404 Not Found |
//! | `ConflictError`, `DuplicateKey` | 409 Conflict |
//! | `UnprocessableEntity` | 422 Unprocessable Entity |
//! | 그 외 | 500 Internal Server Error |

use actix_web::http::StatusCode;
use thiserror::Error;

/// 서비스 에러
///
/// 각 변형의 문자열은 클라이언트에게 그대로 노출되는 메시지입니다.
/// 5xx 변형의 메시지는 로그에도 남습니다.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// MongoDB 명령 실패 또는 저장된 문서 해석 실패 (500)
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 유니크 인덱스 위반 (409)
    ///
    /// 저장소 경계에서만 만들어지며, 조정 서비스는 이를 "이미 존재함"으로 해석합니다.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// OAuth state 저장소 실패 (500)
    #[error("Redis error: {0}")]
    RedisError(String),

    /// 누락되었거나 형식이 틀린 요청 값 (400)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 알 수 없는 프로바이더, 검증 코드, 프로필, 워크스페이스 (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 이미 검증됨, 다른 사용자에게 연결됨, 이미 멤버임 (409)
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// 세션 토큰이 없거나 유효하지 않음, 앵커 세션이 필요함 (401)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// 워크스페이스 멤버가 아니거나 관리 권한이 없음 (403)
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// 형식은 맞지만 외부 확인에 실패한 값, 예를 들어 Discord가 거부한 봇 토큰 (422)
    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// 아이덴티티 프로바이더가 코드나 토큰 교환을 거부함 (400)
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// 프로바이더 또는 결제 API에 닿지 못함 (500)
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 그 밖의 불변식 위반 (500)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 클라이언트에게 노출되는 메시지 (분류 접두사 제외)
    pub fn message(&self) -> &str {
        match self {
            AppError::DatabaseError(m)
            | AppError::DuplicateKey(m)
            | AppError::RedisError(m)
            | AppError::ValidationError(m)
            | AppError::NotFound(m)
            | AppError::ConflictError(m)
            | AppError::AuthenticationError(m)
            | AppError::AuthorizationError(m)
            | AppError::UnprocessableEntity(m)
            | AppError::ProviderError(m)
            | AppError::ExternalServiceError(m)
            | AppError::InternalError(m) => m,
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::ProviderError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) | AppError::DuplicateKey(_) => StatusCode::CONFLICT,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `{ result: null, error, code }` 봉투
    fn error_response(&self) -> actix_web::HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            log::error!("요청 처리 실패: {}", self);
        }

        actix_web::HttpResponse::build(status).json(serde_json::json!({
            "result": null,
            "error": self.message(),
            "code": status.as_u16(),
        }))
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// 시작 단계에서 라이브러리 에러에 설명을 붙여 `InternalError`로 바꿉니다.
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> AppResult<T>;
}

impl<T, E: std::fmt::Display> ErrorContext<T> for Result<T, E> {
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }
}
