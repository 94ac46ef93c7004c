//! # 인증 흐름 서비스
//!
//! 디스패처로 어댑터를 고르고, 콜백 결과를 조정 서비스에 넘긴 뒤 세션 토큰을 발급합니다.
//! HTTP 세부 사항(쿠키, 리다이렉트)은 핸들러가 담당합니다.
//!
//! ## 세션 토큰의 주체
//!
//! 토큰에는 항상 앵커 레코드가 담깁니다.
//!
//! - 앵커 프로바이더 콜백: 방금 조정된 레코드
//! - 그 밖의 콜백: 요청에 실린 기존 앵커 세션의 레코드 (없으면 토큰을 발급하지 않음)

use std::sync::Arc;
use crate::domain::dto::auth::ReconcileAction;
use crate::domain::entities::providers::LinkedProvider;
use crate::domain::models::auth::AuthenticatedUser;
use crate::errors::AppResult;
use crate::services::auth::identity_service::{IdentityService, Reconciled};
use crate::services::auth::providers::{LoginOutcome, LoginStart, LogoutOutcome, ProviderRegistry, ProviderRequest};
use crate::services::auth::token_service::TokenService;

/// 콜백 처리 결과
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackResult {
    pub action: ReconcileAction,
    pub provider: LinkedProvider,
    /// 리다이렉트 응답에서 `token` 쿠키로 설정할 세션 토큰
    pub session_token: Option<String>,
}

pub struct AuthService {
    registry: ProviderRegistry,
    identities: IdentityService,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(registry: ProviderRegistry, identities: IdentityService, tokens: Arc<TokenService>) -> Self {
        Self { registry, identities, tokens }
    }

    /// 프로바이더 로그인을 시작합니다.
    ///
    /// # Arguments
    ///
    /// * `provider` - 경로의 프로바이더 이름
    /// * `request` - 쿼리/폼 값과 현재 앵커 세션
    ///
    /// # Returns
    ///
    /// 인가 페이지로의 리다이렉트, 또는 Roblox 검증 문구
    ///
    /// # Errors
    ///
    /// * `NotFound` - 알 수 없는 프로바이더
    /// * 어댑터 에러 (`ValidationError`, `AuthenticationError`, `ProviderError` 등)
    pub async fn begin_login(&self, provider: &str, request: &ProviderRequest) -> AppResult<LoginStart> {
        let adapter = self.registry.resolve(provider)?;
        log::debug!("{} 로그인 시작", adapter.provider());
        adapter.flow().begin_login(request).await
    }

    /// 콜백을 처리하고 연결 레코드를 조정한 뒤 세션 토큰을 발급합니다.
    ///
    /// # Returns
    ///
    /// 조정 결과와, 앵커 레코드에 대해 발급한 세션 토큰 (앵커 세션이 없으면 `None`)
    ///
    /// # Errors
    ///
    /// * `NotFound` - 알 수 없는 프로바이더 또는 검증 코드
    /// * `ProviderError` - 프로바이더가 교환을 거부함
    /// * `AuthenticationError` - 비앵커 프로바이더인데 앵커 세션이 없음
    /// * `ConflictError` - 다른 사용자에게 연결된 외부 계정, 이미 검증된 코드
    pub async fn complete_login(&self, provider: &str, request: &ProviderRequest) -> AppResult<CallbackResult> {
        let adapter = self.registry.resolve(provider)?;

        let (action, provider) = match adapter.flow().complete_login(request).await? {
            LoginOutcome::Authenticated(identity) => {
                let Reconciled { action, provider } = self.identities
                    .reconcile(&identity, request.anchor.as_ref())
                    .await?;
                (action, provider)
            }
            LoginOutcome::Verified(provider) => (ReconcileAction::Updated, provider),
        };

        let session_token = self.session_for(&provider, request.anchor.as_ref())?;
        Ok(CallbackResult { action, provider, session_token })
    }

    /// 프로바이더별 로그아웃. Discord는 세션 종료, 나머지는 연결 해제입니다.
    pub async fn logout(&self, provider: &str, request: &ProviderRequest) -> AppResult<LogoutOutcome> {
        let adapter = self.registry.resolve(provider)?;
        adapter.flow().logout(request).await
    }

    /// 세션 토큰을 검증하고 앵커 아이덴티티를 돌려줍니다.
    ///
    /// # Errors
    ///
    /// * `AuthenticationError` - 만료, 서명 불일치, 형식 오류
    pub fn authenticate(&self, token: &str) -> AppResult<AuthenticatedUser> {
        Ok(self.tokens.verify(token)?.into())
    }

    fn session_for(&self, linked: &LinkedProvider, anchor: Option<&AuthenticatedUser>) -> AppResult<Option<String>> {
        if linked.provider_type.is_anchor() {
            return Ok(Some(self.tokens.issue(&linked.provider_id, linked)?));
        }

        match anchor {
            Some(anchor) => Ok(Some(self.tokens.issue(&anchor.subject, &anchor.provider)?)),
            None => Ok(None),
        }
    }
}
