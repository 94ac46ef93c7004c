//! 프로바이더 인증 완료 결과
//!
//! 어댑터가 프로바이더 고유 응답을 정규화한 형태이며,
//! 아이덴티티 조정 서비스의 입력으로 사용됩니다.

use chrono::{DateTime, Utc};
use crate::config::AuthProvider;
use crate::domain::entities::providers::ProviderData;

/// 정규화된 프로바이더 아이덴티티
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderIdentity {
    /// 프로바이더 고유 사용자 ID
    pub native_id: String,
    /// 표시 이름 (프로필의 preferred_name으로 복사됨)
    pub display_name: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub data: ProviderData,
}

impl ProviderIdentity {
    pub fn provider(&self) -> AuthProvider {
        self.data.provider()
    }
}
