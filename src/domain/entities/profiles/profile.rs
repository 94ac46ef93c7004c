//! Profile Entity Implementation
//!
//! 사용자마다 하나씩 존재하는 표시용 프로필입니다.
//! 앵커 프로바이더(Discord)의 최초 연결 시 생성되고, 앵커 정보가 갱신될 때마다 함께 갱신됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::models::identity::ProviderIdentity;

/// 앵커 프로바이더에서 복사해 온 아이덴티티 정보
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileIdentityData {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub provider_id: String,
    #[serde(default)]
    pub email_verified: bool,
}

impl ProfileIdentityData {
    fn from_identity(identity: &ProviderIdentity) -> Self {
        Self {
            sub: identity.native_id.clone(),
            name: identity.display_name.clone(),
            email: identity.email.clone(),
            avatar_url: identity.avatar_url.clone(),
            provider_id: identity.native_id.clone(),
            email_verified: identity.email_verified,
        }
    }
}

/// 사용자 프로필
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// 내부 사용자 ID. `LinkedProvider.user_id`와 같은 값입니다.
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub preferred_name: String,
    #[serde(default)]
    pub identity_data: ProfileIdentityData,
    pub discord_id: String,
    /// 결제 프로바이더 고객 핸들
    #[serde(default)]
    pub stripe_customer_id: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// 앵커 아이덴티티로부터 새 프로필을 만듭니다.
    pub fn from_anchor(
        user_id: impl Into<String>,
        identity: &ProviderIdentity,
        stripe_customer_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: user_id.into(),
            email: identity.email.clone(),
            preferred_name: identity.display_name.clone(),
            identity_data: ProfileIdentityData::from_identity(identity),
            discord_id: identity.native_id.clone(),
            stripe_customer_id,
            avatar_url: identity.avatar_url.clone(),
            banner: identity.banner_url.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 앵커 정보가 갱신되었을 때 복사된 필드를 다시 맞춥니다.
    pub fn mirror_anchor(&mut self, identity: &ProviderIdentity, now: DateTime<Utc>) {
        self.email = identity.email.clone();
        self.preferred_name = identity.display_name.clone();
        self.identity_data = ProfileIdentityData::from_identity(identity);
        self.avatar_url = identity.avatar_url.clone();
        self.banner = identity.banner_url.clone();
        self.updated_at = now;
    }
}
