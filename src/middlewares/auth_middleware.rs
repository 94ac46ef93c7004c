//! 세션 인증 미들웨어
//!
//! ActixWeb 요청 파이프라인에서 세션 토큰을 검증하고 앵커 아이덴티티를 추출합니다.
//! 토큰은 `Authorization: Bearer` 헤더를 먼저 보고, 없으면 `token` 쿠키에서 읽습니다.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpRequest, Result,
    body::EitherBody,
};
use crate::config::CookieConfig;
use crate::middlewares::auth_inner::AuthMiddlewareService;
use crate::services::auth::extract_bearer_token;

/// 요청에서 세션 토큰을 꺼냅니다.
pub fn session_credential(req: &HttpRequest) -> Option<String> {
    let bearer = req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::to_string);

    bearer.or_else(|| {
        req.cookie(CookieConfig::TOKEN)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// 토큰이 없거나 유효하지 않을 때의 처리
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthMode {
    /// 401로 끊습니다 (`/workspaces`, 계정 엔드포인트)
    Required,
    /// 앵커 없이 통과시킵니다 (`/auth` 로그인/콜백)
    Optional,
}

/// 세션 인증 미들웨어
pub struct AuthMiddleware {
    mode: AuthMode,
}

impl AuthMiddleware {
    pub fn new(mode: AuthMode) -> Self {
        Self { mode }
    }

    /// 필수 인증 미들웨어 생성
    pub fn required() -> Self {
        Self::new(AuthMode::Required)
    }

    /// 선택적 인증 미들웨어 생성
    pub fn optional() -> Self {
        Self::new(AuthMode::Optional)
    }
}

/// ActixWeb Transform trait 구현
impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            mode: self.mode,
        }))
    }
}
