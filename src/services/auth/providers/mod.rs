//! # 프로바이더 어댑터
//!
//! 프로바이더마다 로그인 시작, 콜백 완료, 로그아웃의 세 가지 동작을 [`LoginFlow`] 계약으로 구현합니다.
//!
//! | 프로바이더 | 로그인 시작 | 콜백 완료 | 로그아웃 |
//! |-----------|------------|----------|---------|
//! | Discord | 동의 화면 리다이렉트 (`state` 발급) | 코드 교환 → 사용자 조회 | 토큰 폐기 + 세션 쿠키 제거 |
//! | LastFM | 인증 페이지 리다이렉트 | 토큰 → 세션 키 교환 | 연결 레코드 삭제 |
//! | Roblox | 검증 문구 발급 | 프로필 설명 검증 | 연결 레코드 삭제 |
//!
//! [`ProviderRegistry`]는 경로 파라미터로 받은 프로바이더 이름을 닫힌 합 타입
//! [`ProviderAdapter`]로 해석하며, 어댑터 선택은 `match` 한 곳에서만 일어납니다.

pub mod discord;
pub mod lastfm;
pub mod roblox;

pub use discord::DiscordProvider;
pub use lastfm::LastFmProvider;
pub use roblox::RobloxProvider;

use async_trait::async_trait;
use crate::config::AuthProvider;
use crate::domain::dto::auth::{ChallengeIssued, ProviderParams};
use crate::domain::entities::providers::LinkedProvider;
use crate::domain::models::auth::AuthenticatedUser;
use crate::domain::models::identity::ProviderIdentity;
use crate::errors::{AppError, AppResult};

/// 어댑터에 전달되는 요청
///
/// HTTP 계층과 분리되어 있어 어댑터는 쿠키나 헤더를 직접 보지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    pub params: ProviderParams,
    /// 세션 토큰에서 얻은 앵커 아이덴티티 (없으면 비로그인 요청)
    pub anchor: Option<AuthenticatedUser>,
}

impl ProviderRequest {
    pub fn new(params: ProviderParams, anchor: Option<AuthenticatedUser>) -> Self {
        Self { params, anchor }
    }

    pub fn require_anchor(&self) -> AppResult<&AuthenticatedUser> {
        self.anchor.as_ref().ok_or_else(|| {
            AppError::AuthenticationError("You must be logged in to access this page!".to_string())
        })
    }
}

/// 로그인 시작 결과
#[derive(Debug, Clone, PartialEq)]
pub enum LoginStart {
    /// 외부 동의/인증 페이지로 이동
    Redirect(String),
    /// Roblox 검증 문구 발급
    Challenge(ChallengeIssued),
}

/// 콜백 완료 결과
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// 프로바이더 인증이 끝났고 조정(reconcile)이 필요함
    Authenticated(ProviderIdentity),
    /// Roblox 검증이 끝나 저장소에 이미 반영됨
    Verified(LinkedProvider),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// 세션 기반 로그아웃. 호출자가 세션 쿠키를 지워야 합니다.
    SessionEnded,
    /// 연결 해제. 삭제된 레코드가 없으면 `removed == false`
    Unlinked { removed: bool },
}

/// 프로바이더 어댑터 공통 계약
#[async_trait]
pub trait LoginFlow: Send + Sync {
    fn provider(&self) -> AuthProvider;

    async fn begin_login(&self, request: &ProviderRequest) -> AppResult<LoginStart>;

    async fn complete_login(&self, request: &ProviderRequest) -> AppResult<LoginOutcome>;

    async fn logout(&self, request: &ProviderRequest) -> AppResult<LogoutOutcome>;
}

/// 프로바이더가 콜백에 실어 보낸 실패를 `ProviderError`로 바꿉니다.
pub(crate) fn reported_error(params: &ProviderParams) -> Option<AppError> {
    params.error.as_ref().map(|error| {
        let message = params.error_description.clone().unwrap_or_else(|| error.clone());
        AppError::ProviderError(message)
    })
}

/// 레지스트리가 돌려주는 어댑터 (닫힌 합 타입)
#[derive(Clone, Copy)]
pub enum ProviderAdapter<'a> {
    Discord(&'a DiscordProvider),
    LastFm(&'a LastFmProvider),
    Roblox(&'a RobloxProvider),
}

impl<'a> ProviderAdapter<'a> {
    pub fn flow(self) -> &'a dyn LoginFlow {
        match self {
            ProviderAdapter::Discord(adapter) => adapter,
            ProviderAdapter::LastFm(adapter) => adapter,
            ProviderAdapter::Roblox(adapter) => adapter,
        }
    }

    pub fn provider(self) -> AuthProvider {
        self.flow().provider()
    }
}

/// 프로바이더 디스패처
///
/// 상태를 갖지 않으며, 어댑터 인스턴스만 보관합니다.
pub struct ProviderRegistry {
    discord: DiscordProvider,
    lastfm: LastFmProvider,
    roblox: RobloxProvider,
}

impl ProviderRegistry {
    pub fn new(discord: DiscordProvider, lastfm: LastFmProvider, roblox: RobloxProvider) -> Self {
        Self { discord, lastfm, roblox }
    }

    pub fn adapter(&self, provider: AuthProvider) -> ProviderAdapter<'_> {
        match provider {
            AuthProvider::Discord => ProviderAdapter::Discord(&self.discord),
            AuthProvider::LastFm => ProviderAdapter::LastFm(&self.lastfm),
            AuthProvider::Roblox => ProviderAdapter::Roblox(&self.roblox),
        }
    }

    /// 경로 파라미터를 어댑터로 해석합니다. 모르는 이름이면 `NotFound`.
    pub fn resolve(&self, name: &str) -> AppResult<ProviderAdapter<'_>> {
        let provider = AuthProvider::from_str(name).map_err(AppError::NotFound)?;
        Ok(self.adapter(provider))
    }
}


#[cfg(test)]
mod tests {
    use crate::clients::fakes::{FakeDiscord, FakeLastFm, FakeRoblox};
    use super::testing::fixture;
    use super::*;

    #[test]
    fn test_resolve_dispatches_by_name() {
        let fx = fixture(FakeDiscord::default(), FakeLastFm::default(), FakeRoblox::default(), &[]);

        for provider in AuthProvider::ALL {
            let adapter = fx.registry.resolve(provider.as_str()).unwrap();
            assert_eq!(adapter.provider(), provider);
        }
        assert_eq!(fx.registry.resolve("LastFM").unwrap().provider(), AuthProvider::LastFm);
    }

    #[test]
    fn test_unknown_provider_is_not_found() {
        let fx = fixture(FakeDiscord::default(), FakeLastFm::default(), FakeRoblox::default(), &[]);

        let err = fx.registry.resolve("github").err().unwrap();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_reported_error_prefers_description() {
        let params = ProviderParams {
            error: Some("access_denied".into()),
            error_description: Some("The resource owner denied the request".into()),
            ..Default::default()
        };
        assert_eq!(
            reported_error(&params),
            Some(AppError::ProviderError("The resource owner denied the request".into()))
        );
        assert_eq!(reported_error(&ProviderParams::default()), None);
    }
}
