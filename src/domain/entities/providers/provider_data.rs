//! 프로바이더별 부가 상태
//!
//! 저장소에는 `provider_data` 라는 하나의 JSON 컬럼으로 저장되지만,
//! 코드 안에서는 프로바이더마다 명시적인 타입으로 다룹니다.
//! 변환은 [`ProviderData::from_value`] / [`ProviderData::to_value`] 에서만 일어납니다.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::config::AuthProvider;

/// Roblox 검증 상태
///
/// `pending → verified` 전이만 허용됩니다.
/// 과거 데이터의 `active` 값은 `verified`로 읽힙니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Pending,
    #[serde(alias = "active")]
    Verified,
}

/// Roblox 프로필 설명 검증 챌린지
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobloxChallengeState {
    pub status: ChallengeStatus,
    /// 사용자가 프로필 설명에 붙여넣어야 하는 검증 문구
    pub code: String,
    pub username: String,
}

impl RobloxChallengeState {
    pub fn pending(code: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            status: ChallengeStatus::Pending,
            code: code.into(),
            username: username.into(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ChallengeStatus::Pending
    }

    /// 외부 프로필 텍스트에 검증 문구가 그대로 포함되어 있는지 확인합니다.
    pub fn is_satisfied_by(&self, profile_text: &str) -> bool {
        !self.code.is_empty() && profile_text.contains(&self.code)
    }

    pub fn verified(&self) -> Self {
        Self {
            status: ChallengeStatus::Verified,
            ..self.clone()
        }
    }
}

/// LastFM 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastFmLinkState {
    pub status: LinkStatus,
    #[serde(default)]
    pub subscriber: bool,
}

impl LastFmLinkState {
    pub fn active(subscriber: bool) -> Self {
        Self { status: LinkStatus::Active, subscriber }
    }
}

/// Discord 사용자 정보 스냅샷
///
/// 알려진 필드 외의 값은 `extra`에 그대로 보존됩니다.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiscordIdentityData {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 프로바이더별 부가 상태 (태그드 유니온)
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderData {
    Discord(DiscordIdentityData),
    LastFm(LastFmLinkState),
    Roblox(RobloxChallengeState),
}

impl ProviderData {
    pub fn provider(&self) -> AuthProvider {
        match self {
            ProviderData::Discord(_) => AuthProvider::Discord,
            ProviderData::LastFm(_) => AuthProvider::LastFm,
            ProviderData::Roblox(_) => AuthProvider::Roblox,
        }
    }

    /// 저장소의 `provider_data` 컬럼 값을 프로바이더 타입에 맞춰 해석합니다.
    pub fn from_value(provider: AuthProvider, value: Value) -> Result<Self, serde_json::Error> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        Ok(match provider {
            AuthProvider::Discord => ProviderData::Discord(serde_json::from_value(value)?),
            AuthProvider::LastFm => ProviderData::LastFm(serde_json::from_value(value)?),
            AuthProvider::Roblox => ProviderData::Roblox(serde_json::from_value(value)?),
        })
    }

    pub fn to_value(&self) -> Value {
        let value = match self {
            ProviderData::Discord(data) => serde_json::to_value(data),
            ProviderData::LastFm(data) => serde_json::to_value(data),
            ProviderData::Roblox(data) => serde_json::to_value(data),
        };
        value.unwrap_or(Value::Null)
    }

    pub fn as_roblox(&self) -> Option<&RobloxChallengeState> {
        match self {
            ProviderData::Roblox(state) => Some(state),
            _ => None,
        }
    }
}
