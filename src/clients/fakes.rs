//! 테스트용 가짜 외부 API 구현

use std::collections::HashMap;
use std::sync::Mutex;
use async_trait::async_trait;
use crate::clients::{BillingApi, DiscordApi, LastFmApi, RobloxApi};
use crate::domain::models::providers::{
    BillingCustomer, BillingSubscription, DiscordTokenResponse, DiscordUser, LastFmSession, RobloxUser,
    RobloxUserSummary,
};
use crate::errors::{AppError, AppResult};

#[derive(Default)]
pub struct FakeDiscord {
    /// 인가 코드 → 액세스 토큰
    codes: Mutex<HashMap<String, String>>,
    /// 액세스 토큰 → 사용자
    users: Mutex<HashMap<String, DiscordUser>>,
    /// 봇 토큰 → 봇 계정
    bots: Mutex<HashMap<String, DiscordUser>>,
    pub revoked: Mutex<Vec<String>>,
}

impl FakeDiscord {
    pub fn with_user(self, code: &str, access_token: &str, user: DiscordUser) -> Self {
        self.codes.lock().unwrap().insert(code.to_string(), access_token.to_string());
        self.users.lock().unwrap().insert(access_token.to_string(), user);
        self
    }

    pub fn with_bot(self, token: &str, bot: DiscordUser) -> Self {
        self.bots.lock().unwrap().insert(token.to_string(), bot);
        self
    }

    pub fn user(id: &str, username: &str) -> DiscordUser {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "username": username,
            "avatar": "a_animated",
            "email": format!("{}@example.com", username),
            "verified": true,
        }))
        .unwrap()
    }
}

#[async_trait]
impl DiscordApi for FakeDiscord {
    async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> AppResult<DiscordTokenResponse> {
        let token = self.codes.lock().unwrap().get(code).cloned()
            .ok_or_else(|| AppError::ProviderError("Discord rejected the request (400)".to_string()))?;

        Ok(DiscordTokenResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: 604800,
            refresh_token: Some("refresh".to_string()),
            scope: "identify email guilds".to_string(),
        })
    }

    async fn fetch_current_user(&self, access_token: &str) -> AppResult<DiscordUser> {
        self.users.lock().unwrap().get(access_token).cloned()
            .ok_or_else(|| AppError::ProviderError("Discord rejected the request (401)".to_string()))
    }

    async fn revoke_token(&self, access_token: &str) -> AppResult<()> {
        self.revoked.lock().unwrap().push(access_token.to_string());
        Ok(())
    }

    async fn fetch_bot_user(&self, bot_token: &str) -> AppResult<DiscordUser> {
        self.bots.lock().unwrap().get(bot_token).cloned()
            .ok_or_else(|| AppError::UnprocessableEntity("Invalid token".to_string()))
    }
}

#[derive(Default)]
pub struct FakeLastFm {
    sessions: Mutex<HashMap<String, LastFmSession>>,
}

impl FakeLastFm {
    pub fn with_session(self, token: &str, name: &str) -> Self {
        self.sessions.lock().unwrap().insert(token.to_string(), LastFmSession {
            name: name.to_string(),
            key: format!("sk-{}", name),
            subscriber: 0,
        });
        self
    }
}

#[async_trait]
impl LastFmApi for FakeLastFm {
    async fn get_session(&self, token: &str) -> AppResult<LastFmSession> {
        self.sessions.lock().unwrap().get(token).cloned()
            .ok_or_else(|| AppError::ProviderError("Unauthorized Token - This token has not been issued".to_string()))
    }
}

#[derive(Default)]
pub struct FakeRoblox {
    users: Mutex<HashMap<String, u64>>,
    descriptions: Mutex<HashMap<u64, String>>,
}

impl FakeRoblox {
    pub fn with_user(self, username: &str, id: u64, description: &str) -> Self {
        self.users.lock().unwrap().insert(username.to_lowercase(), id);
        self.descriptions.lock().unwrap().insert(id, description.to_string());
        self
    }

    pub fn set_description(&self, id: u64, description: &str) {
        self.descriptions.lock().unwrap().insert(id, description.to_string());
    }
}

#[async_trait]
impl RobloxApi for FakeRoblox {
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<RobloxUserSummary>> {
        Ok(self.users.lock().unwrap().get(&username.to_lowercase()).map(|id| RobloxUserSummary {
            id: *id,
            name: username.to_string(),
            display_name: username.to_string(),
        }))
    }

    async fn get_user(&self, user_id: &str) -> AppResult<RobloxUser> {
        let id: u64 = user_id.parse().map_err(|_| AppError::NotFound("Roblox user not found".to_string()))?;
        let description = self.descriptions.lock().unwrap().get(&id).cloned()
            .ok_or_else(|| AppError::NotFound("Roblox user not found".to_string()))?;

        Ok(RobloxUser {
            id,
            name: format!("user{}", id),
            display_name: format!("user{}", id),
            description,
        })
    }
}

#[derive(Default)]
pub struct FakeBilling {
    pub fail_customers: bool,
    pub fail_subscriptions: bool,
    pub customers: Mutex<Vec<String>>,
    pub subscriptions: Mutex<Vec<String>>,
    pub cancelled: Mutex<Vec<String>>,
}

#[async_trait]
impl BillingApi for FakeBilling {
    async fn create_customer(&self, _email: Option<&str>, _name: &str, profile_id: &str) -> AppResult<BillingCustomer> {
        if self.fail_customers {
            return Err(AppError::ExternalServiceError("Stripe 요청 실패: unavailable".to_string()));
        }
        let id = format!("cus_{}", profile_id);
        self.customers.lock().unwrap().push(id.clone());
        Ok(BillingCustomer { id })
    }

    async fn create_subscription(&self, customer_id: &str, price_id: &str) -> AppResult<BillingSubscription> {
        if self.fail_subscriptions {
            return Err(AppError::ExternalServiceError("Stripe 요청 실패: card_declined".to_string()));
        }
        let id = format!("sub_{}_{}", customer_id, price_id);
        self.subscriptions.lock().unwrap().push(id.clone());
        Ok(BillingSubscription { id, status: "active".to_string() })
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> AppResult<()> {
        self.cancelled.lock().unwrap().push(subscription_id.to_string());
        Ok(())
    }
}
