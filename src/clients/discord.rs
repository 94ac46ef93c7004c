//! Discord OAuth2 / REST 클라이언트
//!
//! | 용도 | 엔드포인트 | 메서드 |
//! |------|------------|--------|
//! | Token Exchange | `{api_base}/oauth2/token` | POST (form) |
//! | Token Revoke | `{api_base}/oauth2/token/revoke` | POST (form) |
//! | Current User | `{api_base}/users/@me` | GET (Bearer) |
//! | Bot User | `{api_base}/users/@me` | GET (`Bot <token>`) |
//!
//! 봇 토큰 확인은 다른 호출과 달리 실패 응답을 모두 `UnprocessableEntity("Invalid token")`로 돌려줍니다.

use async_trait::async_trait;
use crate::clients::{read_json, transport_error};
use crate::config::DiscordOAuthConfig;
use crate::domain::models::providers::{DiscordTokenResponse, DiscordUser};
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "Discord";

#[async_trait]
pub trait DiscordApi: Send + Sync {
    /// 인가 코드를 액세스 토큰으로 교환합니다.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> AppResult<DiscordTokenResponse>;

    /// 액세스 토큰 소유자의 프로필을 조회합니다.
    async fn fetch_current_user(&self, access_token: &str) -> AppResult<DiscordUser>;

    /// 액세스 토큰을 폐기합니다.
    async fn revoke_token(&self, access_token: &str) -> AppResult<()>;

    /// 봇 토큰으로 봇 계정을 조회합니다.
    ///
    /// # Errors
    ///
    /// Discord가 200 이외로 응답하면 `UnprocessableEntity("Invalid token")`.
    async fn fetch_bot_user(&self, bot_token: &str) -> AppResult<DiscordUser>;
}

pub struct DiscordClient {
    http: reqwest::Client,
    config: DiscordOAuthConfig,
}

impl DiscordClient {
    pub fn new(http: reqwest::Client, config: DiscordOAuthConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl DiscordApi for DiscordClient {
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> AppResult<DiscordTokenResponse> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.http
            .post(self.endpoint("/oauth2/token"))
            .form(&params)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        read_json(SERVICE, response).await
    }

    async fn fetch_current_user(&self, access_token: &str) -> AppResult<DiscordUser> {
        let response = self.http
            .get(self.endpoint("/users/@me"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        read_json(SERVICE, response).await
    }

    async fn revoke_token(&self, access_token: &str) -> AppResult<()> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("token", access_token),
            ("token_type_hint", "access_token"),
        ];

        let response = self.http
            .post(self.endpoint("/oauth2/token/revoke"))
            .form(&params)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Discord 토큰 폐기 실패: {}", response.status()
            )));
        }

        Ok(())
    }

    async fn fetch_bot_user(&self, bot_token: &str) -> AppResult<DiscordUser> {
        let response = self.http
            .get(self.endpoint("/users/@me"))
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", bot_token))
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        if !response.status().is_success() {
            log::warn!("Discord 봇 토큰 확인 실패: {}", response.status());
            return Err(AppError::UnprocessableEntity("Invalid token".to_string()));
        }

        read_json(SERVICE, response).await
    }
}
