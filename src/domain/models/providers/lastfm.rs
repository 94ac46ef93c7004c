//! LastFM API 응답 모델

use serde::Deserialize;
use crate::domain::entities::providers::{LastFmLinkState, ProviderData};
use crate::domain::models::identity::ProviderIdentity;

/// `auth.getSession` 응답
#[derive(Debug, Clone, Deserialize)]
pub struct LastFmSessionResponse {
    pub session: LastFmSession,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastFmSession {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub subscriber: i64,
}

/// LastFM 에러 응답 (`{"error": 4, "message": "..."}`)
#[derive(Debug, Clone, Deserialize)]
pub struct LastFmErrorResponse {
    pub error: i64,
    pub message: String,
}

impl LastFmSession {
    /// 세션 키는 만료되지 않으므로 `expires_at`은 비워 둡니다.
    pub fn into_identity(self) -> ProviderIdentity {
        ProviderIdentity {
            native_id: self.name.clone(),
            display_name: self.name,
            access_token: Some(self.key),
            refresh_token: None,
            expires_at: None,
            avatar_url: None,
            banner_url: None,
            email: None,
            email_verified: false,
            data: ProviderData::LastFm(LastFmLinkState::active(self.subscriber > 0)),
        }
    }
}
