//! Discord 어댑터 (앵커 프로바이더)
//!
//! OAuth 2.0 인가 코드 흐름을 사용합니다. 로그인 시작 시 `state`를 발급해 저장하고,
//! 콜백에서 한 번만 소비한 뒤 코드를 액세스 토큰으로 교환합니다.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use chrono::Utc;
use crate::caching::oauth_state::OAuthStateStore;
use crate::clients::DiscordApi;
use crate::config::{AuthProvider, CallbackUrlTemplate, DiscordOAuthConfig};
use crate::errors::{AppError, AppResult};
use crate::repositories::ProviderRepository;
use super::{reported_error, LoginFlow, LoginOutcome, LoginStart, LogoutOutcome, ProviderRequest};

pub struct DiscordProvider {
    api: Arc<dyn DiscordApi>,
    states: Arc<dyn OAuthStateStore>,
    providers: Arc<dyn ProviderRepository>,
    config: DiscordOAuthConfig,
    redirect_uri: String,
    state_ttl: Duration,
}

impl DiscordProvider {
    /// # Arguments
    ///
    /// * `states` - OAuth `state` 저장소 (일회용, TTL)
    /// * `callback_url` - `{provider}` 자리에 `discord`를 넣어 `redirect_uri`로 씁니다
    /// * `state_ttl` - `state` 보관 시간
    pub fn new(
        api: Arc<dyn DiscordApi>,
        states: Arc<dyn OAuthStateStore>,
        providers: Arc<dyn ProviderRepository>,
        config: DiscordOAuthConfig,
        callback_url: &CallbackUrlTemplate,
        state_ttl: Duration,
    ) -> Self {
        Self {
            api,
            states,
            providers,
            config,
            redirect_uri: callback_url.render(AuthProvider::Discord),
            state_ttl,
        }
    }

    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.config.scopes.join(" ")),
            urlencoding::encode(state),
        )
    }
}

#[async_trait]
impl LoginFlow for DiscordProvider {
    fn provider(&self) -> AuthProvider {
        AuthProvider::Discord
    }

    async fn begin_login(&self, _request: &ProviderRequest) -> AppResult<LoginStart> {
        let state = uuid::Uuid::new_v4().simple().to_string();
        self.states.issue(&state, AuthProvider::Discord, self.state_ttl).await?;

        log::debug!("Discord 동의 화면으로 이동 (state 발급)");
        Ok(LoginStart::Redirect(self.authorize_url(&state)))
    }

    async fn complete_login(&self, request: &ProviderRequest) -> AppResult<LoginOutcome> {
        let params = &request.params;
        if let Some(error) = reported_error(params) {
            log::warn!("Discord가 인증 실패를 보고함: {}", error.message());
            return Err(error);
        }

        let state = params.state.as_deref()
            .ok_or_else(|| AppError::ValidationError("Invalid OAuth state".to_string()))?;
        if !self.states.consume(state, AuthProvider::Discord).await? {
            log::warn!("알 수 없거나 이미 사용된 OAuth state");
            return Err(AppError::ValidationError("Invalid OAuth state".to_string()));
        }

        let code = params.code.as_deref()
            .ok_or_else(|| AppError::ValidationError("Missing authorization code".to_string()))?;

        let token = self.api.exchange_code(code, &self.redirect_uri).await?;
        let user = self.api.fetch_current_user(&token.access_token).await?;
        log::info!("Discord 인증 완료: {}", user.id);

        Ok(LoginOutcome::Authenticated(
            user.into_identity(Some(&token), &self.config.cdn_base, Utc::now()),
        ))
    }

    /// 저장된 Discord 액세스 토큰을 폐기합니다.
    ///
    /// 폐기 실패는 로그만 남기며, 로컬 세션은 항상 종료됩니다.
    async fn logout(&self, request: &ProviderRequest) -> AppResult<LogoutOutcome> {
        let Some(anchor) = request.anchor.as_ref() else {
            return Ok(LogoutOutcome::SessionEnded);
        };

        let stored = self.providers
            .find_by_user_and_type(&anchor.user_id, AuthProvider::Discord)
            .await?;

        if let Some(token) = stored.and_then(|p| p.provider_access_token) {
            if let Err(e) = self.api.revoke_token(&token).await {
                log::warn!("Discord 토큰 폐기 실패 ({}): {}", anchor.user_id, e);
            }
        }

        log::info!("Discord 로그아웃: {}", anchor.user_id);
        Ok(LogoutOutcome::SessionEnded)
    }
}

#[cfg(test)]
mod tests {
    use crate::clients::fakes::{FakeDiscord, FakeLastFm, FakeRoblox};
    use crate::domain::dto::auth::ProviderParams;
    use crate::services::auth::providers::testing::{anchor, fixture};
    use super::*;

    fn state_of(url: &str) -> String {
        url.split("state=").nth(1).unwrap().split('&').next().unwrap().to_string()
    }

    fn discord() -> FakeDiscord {
        FakeDiscord::default().with_user("good-code", "access-1", FakeDiscord::user("80351110224678912", "nelly"))
    }

    #[actix_web::test]
    async fn test_begin_login_redirects_to_consent_screen() {
        let fx = fixture(discord(), FakeLastFm::default(), FakeRoblox::default(), &[]);
        let adapter = fx.registry.adapter(AuthProvider::Discord).flow();

        let LoginStart::Redirect(url) = adapter.begin_login(&ProviderRequest::default()).await.unwrap() else {
            panic!("expected redirect");
        };

        assert!(url.starts_with("https://discord.com/oauth2/authorize?client_id=client-id"));
        assert!(url.contains("scope=identify%20email%20guilds"));
        assert!(url.contains(&urlencoding::encode("https://api.astralapp.io/api/v1/auth/callback/discord").into_owned()));
        assert!(!state_of(&url).is_empty());
    }

    #[actix_web::test]
    async fn test_complete_login_consumes_state_once() {
        let fx = fixture(discord(), FakeLastFm::default(), FakeRoblox::default(), &[]);
        let adapter = fx.registry.adapter(AuthProvider::Discord).flow();

        let LoginStart::Redirect(url) = adapter.begin_login(&ProviderRequest::default()).await.unwrap() else {
            panic!("expected redirect");
        };
        let request = ProviderRequest::new(
            ProviderParams {
                code: Some("good-code".into()),
                state: Some(state_of(&url)),
                ..Default::default()
            },
            None,
        );

        let LoginOutcome::Authenticated(identity) = adapter.complete_login(&request).await.unwrap() else {
            panic!("expected identity");
        };
        assert_eq!(identity.native_id, "80351110224678912");
        assert_eq!(identity.access_token.as_deref(), Some("access-1"));
        assert_eq!(identity.email.as_deref(), Some("nelly@example.com"));

        // 같은 state를 다시 쓰면 거부
        let replay = adapter.complete_login(&request).await.unwrap_err();
        assert_eq!(replay, AppError::ValidationError("Invalid OAuth state".into()));
    }

    #[actix_web::test]
    async fn test_complete_login_rejects_unknown_state_and_reported_errors() {
        let fx = fixture(discord(), FakeLastFm::default(), FakeRoblox::default(), &[]);
        let adapter = fx.registry.adapter(AuthProvider::Discord).flow();

        let forged = ProviderRequest::new(
            ProviderParams { code: Some("good-code".into()), state: Some("forged".into()), ..Default::default() },
            None,
        );
        assert!(matches!(adapter.complete_login(&forged).await, Err(AppError::ValidationError(_))));

        let denied = ProviderRequest::new(
            ProviderParams { error: Some("access_denied".into()), ..Default::default() },
            None,
        );
        assert_eq!(
            adapter.complete_login(&denied).await.unwrap_err(),
            AppError::ProviderError("access_denied".into())
        );
    }

    #[actix_web::test]
    async fn test_bad_code_is_provider_error() {
        let fx = fixture(discord(), FakeLastFm::default(), FakeRoblox::default(), &[]);
        let adapter = fx.registry.adapter(AuthProvider::Discord).flow();

        let LoginStart::Redirect(url) = adapter.begin_login(&ProviderRequest::default()).await.unwrap() else {
            panic!("expected redirect");
        };
        let request = ProviderRequest::new(
            ProviderParams { code: Some("expired".into()), state: Some(state_of(&url)), ..Default::default() },
            None,
        );

        assert!(matches!(adapter.complete_login(&request).await, Err(AppError::ProviderError(_))));
    }

    #[actix_web::test]
    async fn test_logout_revokes_stored_token() {
        let fx = fixture(discord(), FakeLastFm::default(), FakeRoblox::default(), &[]);
        let user = anchor("user-1");
        fx.providers.insert(&user.provider).await.unwrap();

        let outcome = fx.registry
            .adapter(AuthProvider::Discord)
            .flow()
            .logout(&ProviderRequest::new(ProviderParams::default(), Some(user)))
            .await
            .unwrap();

        assert_eq!(outcome, LogoutOutcome::SessionEnded);
        assert_eq!(*fx.discord_api.revoked.lock().unwrap(), vec!["access-user-1".to_string()]);
    }
}
