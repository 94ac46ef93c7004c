//! LastFM 어댑터
//!
//! 앵커 세션이 있는 사용자만 연결할 수 있습니다. 인증 페이지에서 돌아온 `token`을
//! 세션 키로 교환하며, 세션 키는 만료되지 않습니다.

use std::sync::Arc;
use async_trait::async_trait;
use crate::clients::LastFmApi;
use crate::config::{AuthProvider, CallbackUrlTemplate, LastFmConfig};
use crate::errors::{AppError, AppResult};
use crate::repositories::ProviderRepository;
use super::{reported_error, LoginFlow, LoginOutcome, LoginStart, LogoutOutcome, ProviderRequest};

pub struct LastFmProvider {
    api: Arc<dyn LastFmApi>,
    providers: Arc<dyn ProviderRepository>,
    config: LastFmConfig,
    callback_url: String,
}

impl LastFmProvider {
    /// `callback_url`은 LastFM 인가 페이지의 `cb` 파라미터가 됩니다.
    pub fn new(
        api: Arc<dyn LastFmApi>,
        providers: Arc<dyn ProviderRepository>,
        config: LastFmConfig,
        callback_url: &CallbackUrlTemplate,
    ) -> Self {
        Self {
            api,
            providers,
            config,
            callback_url: callback_url.render(AuthProvider::LastFm),
        }
    }
}

#[async_trait]
impl LoginFlow for LastFmProvider {
    fn provider(&self) -> AuthProvider {
        AuthProvider::LastFm
    }

    async fn begin_login(&self, request: &ProviderRequest) -> AppResult<LoginStart> {
        request.require_anchor()?;

        Ok(LoginStart::Redirect(format!(
            "{}?api_key={}&cb={}",
            self.config.auth_url,
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(&self.callback_url),
        )))
    }

    async fn complete_login(&self, request: &ProviderRequest) -> AppResult<LoginOutcome> {
        if let Some(error) = reported_error(&request.params) {
            return Err(error);
        }

        let token = request.params.token.as_deref()
            .ok_or_else(|| AppError::ValidationError("Missing token".to_string()))?;

        let session = self.api.get_session(token).await?;
        log::info!("LastFM 세션 교환 완료: {}", session.name);

        Ok(LoginOutcome::Authenticated(session.into_identity()))
    }

    async fn logout(&self, request: &ProviderRequest) -> AppResult<LogoutOutcome> {
        let anchor = request.require_anchor()?;
        let removed = self.providers
            .delete_by_user_and_type(&anchor.user_id, AuthProvider::LastFm)
            .await?;

        log::info!("LastFM 연결 해제: {} (삭제됨: {})", anchor.user_id, removed);
        Ok(LogoutOutcome::Unlinked { removed })
    }
}
