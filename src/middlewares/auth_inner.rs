//! [`AuthMiddleware`](super::AuthMiddleware)가 감싸는 서비스
//!
//! 토큰이 유효하면 `AuthenticatedUser`를 요청 확장에 넣고, 모드에 따라 401로 끊거나 그냥 통과시킵니다.

use std::rc::Rc;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::{web, Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;
use crate::core::registry::AppServices;
use crate::domain::models::auth::AuthenticatedUser;
use crate::errors::AppError;
use crate::middlewares::auth_middleware::{session_credential, AuthMode};

/// 실제 인증 로직을 수행하는 서비스
pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
    pub mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let mode = self.mode;

        Box::pin(async move {
            let auth_result = authenticate_request(&req);

            match (mode, auth_result) {
                (AuthMode::Required, Err(err)) => {
                    log::warn!("인증 실패: {} ({})", err, req.path());
                    let response = err.error_response();
                    let (req, _) = req.into_parts();
                    let res = ServiceResponse::new(req, response)
                        .map_into_right_body();
                    return Ok(res);
                },
                (_, Ok(user)) => {
                    log::debug!("인증 성공: 사용자 ID {}", user.user_id);
                    req.extensions_mut().insert(user);
                },
                (AuthMode::Optional, Err(_)) => {
                    log::debug!("선택적 인증: 유효한 토큰 없음, 요청 진행");
                },
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// 요청에서 세션 토큰을 추출하고 검증
fn authenticate_request(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let services = req.app_data::<web::Data<AppServices>>()
        .ok_or_else(|| AppError::InternalError("AppServices가 등록되지 않았습니다".to_string()))?;

    let token = session_credential(req.request()).ok_or_else(|| {
        AppError::AuthenticationError("You must be logged in to access this page!".to_string())
    })?;

    services.auth.authenticate(&token)
}
