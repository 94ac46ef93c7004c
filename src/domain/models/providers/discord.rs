//! Discord API 응답 모델

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::domain::entities::providers::{DiscordIdentityData, ProviderData};
use crate::domain::models::identity::ProviderIdentity;

/// `POST /oauth2/token` 응답
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
}

impl DiscordTokenResponse {
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        (self.expires_in > 0).then(|| now + Duration::seconds(self.expires_in))
    }
}

/// `GET /users/@me` 응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 애니메이션 해시(`a_` 접두사)는 gif, 그 외에는 webp
fn cdn_asset(cdn_base: &str, kind: &str, user_id: &str, hash: &str) -> String {
    let ext = if hash.starts_with("a_") { "gif" } else { "webp" };
    format!("{}/{}/{}/{}.{}", cdn_base.trim_end_matches('/'), kind, user_id, hash, ext)
}

impl DiscordUser {
    pub fn avatar_url(&self, cdn_base: &str) -> Option<String> {
        self.avatar
            .as_deref()
            .map(|hash| cdn_asset(cdn_base, "avatars", &self.id, hash))
    }

    pub fn banner_url(&self, cdn_base: &str) -> Option<String> {
        self.banner
            .as_deref()
            .map(|hash| cdn_asset(cdn_base, "banners", &self.id, hash))
    }

    pub fn display_name(&self) -> String {
        self.global_name.clone().unwrap_or_else(|| self.username.clone())
    }

    /// 토큰 교환 결과와 합쳐 정규화된 아이덴티티를 만듭니다.
    pub fn into_identity(
        self,
        token: Option<&DiscordTokenResponse>,
        cdn_base: &str,
        now: DateTime<Utc>,
    ) -> ProviderIdentity {
        let avatar_url = self.avatar_url(cdn_base);
        let banner_url = self.banner_url(cdn_base);
        let display_name = self.display_name();

        ProviderIdentity {
            native_id: self.id,
            display_name,
            access_token: token.map(|t| t.access_token.clone()),
            refresh_token: token.and_then(|t| t.refresh_token.clone()),
            expires_at: token.and_then(|t| t.expires_at(now)),
            avatar_url,
            banner_url,
            email: self.email,
            email_verified: self.verified.unwrap_or(false),
            data: ProviderData::Discord(DiscordIdentityData {
                username: self.username,
                global_name: self.global_name,
                discriminator: self.discriminator,
                verified: self.verified,
                extra: self.extra,
            }),
        }
    }
}
