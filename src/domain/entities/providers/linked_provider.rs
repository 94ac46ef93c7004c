//! LinkedProvider Entity Implementation
//!
//! 하나의 외부 아이덴티티를 하나의 내부 사용자에 묶는 레코드입니다.
//! `(user, type)` 쌍마다 최대 하나만 존재하며, 세션 토큰의 `UserInfo` 클레임으로도 사용됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::config::AuthProvider;
use crate::domain::entities::providers::provider_data::{ProviderData, RobloxChallengeState};
use crate::domain::models::identity::ProviderIdentity;

/// 연결된 프로바이더 레코드
///
/// 직렬화 형태는 저장소 컬럼명(`user`, `type`, `provider_*`)을 그대로 따르며,
/// `provider_data`는 저장소 경계에서 [`ProviderData`]로 해석됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LinkedProviderRecord", into = "LinkedProviderRecord")]
pub struct LinkedProvider {
    /// 내부 ID (저장 전에는 None)
    pub id: Option<String>,
    /// 소유 사용자 ID (프로필 ID와 같음)
    pub user_id: String,
    pub provider_type: AuthProvider,
    /// 프로바이더 고유 사용자 ID
    pub provider_id: String,
    pub provider_access_token: Option<String>,
    pub provider_refresh_token: Option<String>,
    pub provider_expires_at: Option<DateTime<Utc>>,
    pub provider_data: ProviderData,
    pub provider_avatar_url: Option<String>,
    pub provider_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkedProvider {
    /// 완료된 프로바이더 인증 결과로부터 새 레코드를 만듭니다.
    pub fn from_identity(user_id: impl Into<String>, identity: &ProviderIdentity, now: DateTime<Utc>) -> Self {
        Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            user_id: user_id.into(),
            provider_type: identity.provider(),
            provider_id: identity.native_id.clone(),
            provider_access_token: identity.access_token.clone(),
            provider_refresh_token: identity.refresh_token.clone(),
            provider_expires_at: identity.expires_at,
            provider_data: identity.data.clone(),
            provider_avatar_url: identity.avatar_url.clone(),
            provider_email: identity.email.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 대기 상태의 Roblox 검증 레코드를 만듭니다.
    pub fn pending_challenge(
        user_id: impl Into<String>,
        native_id: impl Into<String>,
        challenge: RobloxChallengeState,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            user_id: user_id.into(),
            provider_type: AuthProvider::Roblox,
            provider_id: native_id.into(),
            provider_access_token: None,
            provider_refresh_token: None,
            provider_expires_at: None,
            provider_data: ProviderData::Roblox(challenge),
            provider_avatar_url: None,
            provider_email: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 재인증 결과로 토큰, 만료 시각, 부가 데이터, 아바타, 이메일을 갱신합니다.
    pub fn refresh_from(&mut self, identity: &ProviderIdentity, now: DateTime<Utc>) {
        self.provider_access_token = identity.access_token.clone();
        self.provider_refresh_token = identity.refresh_token.clone();
        self.provider_expires_at = identity.expires_at;
        self.provider_data = identity.data.clone();
        self.provider_avatar_url = identity.avatar_url.clone();
        self.provider_email = identity.email.clone();
        self.updated_at = now;
    }

    pub fn challenge(&self) -> Option<&RobloxChallengeState> {
        self.provider_data.as_roblox()
    }

    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

/// 저장소/토큰 직렬화 형태
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinkedProviderRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    user: String,
    #[serde(rename = "type")]
    provider_type: AuthProvider,
    provider_id: String,
    #[serde(default)]
    provider_access_token: Option<String>,
    #[serde(default)]
    provider_refresh_token: Option<String>,
    #[serde(default)]
    provider_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    provider_data: Value,
    #[serde(default)]
    provider_avatar_url: Option<String>,
    #[serde(default)]
    provider_email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LinkedProviderRecord> for LinkedProvider {
    type Error = String;

    fn try_from(record: LinkedProviderRecord) -> Result<Self, Self::Error> {
        let provider_data = ProviderData::from_value(record.provider_type, record.provider_data)
            .map_err(|e| format!("invalid provider_data for {}: {}", record.provider_type, e))?;

        Ok(Self {
            id: record.id,
            user_id: record.user,
            provider_type: record.provider_type,
            provider_id: record.provider_id,
            provider_access_token: record.provider_access_token,
            provider_refresh_token: record.provider_refresh_token,
            provider_expires_at: record.provider_expires_at,
            provider_data,
            provider_avatar_url: record.provider_avatar_url,
            provider_email: record.provider_email,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl From<LinkedProvider> for LinkedProviderRecord {
    fn from(provider: LinkedProvider) -> Self {
        Self {
            provider_data: provider.provider_data.to_value(),
            id: provider.id,
            user: provider.user_id,
            provider_type: provider.provider_type,
            provider_id: provider.provider_id,
            provider_access_token: provider.provider_access_token,
            provider_refresh_token: provider.provider_refresh_token,
            provider_expires_at: provider.provider_expires_at,
            provider_avatar_url: provider.provider_avatar_url,
            provider_email: provider.provider_email,
            created_at: provider.created_at,
            updated_at: provider.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::providers::provider_data::{ChallengeStatus, LastFmLinkState};
    use serde_json::json;

    fn lastfm_identity() -> ProviderIdentity {
        ProviderIdentity {
            native_id: "rj".to_string(),
            display_name: "rj".to_string(),
            access_token: Some("session-key".to_string()),
            refresh_token: None,
            expires_at: None,
            avatar_url: None,
            banner_url: None,
            email: None,
            email_verified: false,
            data: ProviderData::LastFm(LastFmLinkState::active(false)),
        }
    }

    #[test]
    fn test_serialized_with_store_column_names() {
        let provider = LinkedProvider::from_identity("user-1", &lastfm_identity(), Utc::now());
        let value = serde_json::to_value(&provider).unwrap();

        assert_eq!(value["user"], "user-1");
        assert_eq!(value["type"], "lastfm");
        assert_eq!(value["provider_id"], "rj");
        assert_eq!(value["provider_data"], json!({"status": "active", "subscriber": false}));
    }

    #[test]
    fn test_record_roundtrip_preserves_typed_data() {
        let provider = LinkedProvider::pending_challenge(
            "user-1",
            "156",
            RobloxChallengeState::pending("tiger otter lemur wasp gazelle", "builderman"),
            Utc::now(),
        );
        let value = serde_json::to_value(&provider).unwrap();
        let back: LinkedProvider = serde_json::from_value(value).unwrap();

        assert_eq!(back, provider);
        assert_eq!(back.challenge().unwrap().status, ChallengeStatus::Pending);
    }

    #[test]
    fn test_mismatched_provider_data_fails_to_decode() {
        let value = json!({
            "user": "user-1",
            "type": "roblox",
            "provider_id": "156",
            "provider_data": {"status": "active"},
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        });

        assert!(serde_json::from_value::<LinkedProvider>(value).is_err());
    }

    #[test]
    fn test_refresh_from_replaces_tokens() {
        let mut provider = LinkedProvider::from_identity("user-1", &lastfm_identity(), Utc::now());
        let mut identity = lastfm_identity();
        identity.access_token = Some("new-key".to_string());

        provider.refresh_from(&identity, Utc::now());
        assert_eq!(provider.provider_access_token.as_deref(), Some("new-key"));
    }
}
