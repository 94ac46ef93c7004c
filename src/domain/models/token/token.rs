//! 세션 토큰 클레임
//!
//! 발급 시점의 `LinkedProvider` 스냅샷을 `UserInfo` 클레임으로 담습니다.
//! 서버에 저장되지 않으며, 서명과 만료 시각만으로 유효성이 결정됩니다.
use serde::{Deserialize, Serialize};
use crate::domain::entities::providers::LinkedProvider;

/// 세션 토큰의 클레임(Payload) 구조체
///
/// ## 클레임 구성
///
/// - `UserInfo`: 발급 시점의 연결 프로바이더 레코드
/// - `sub`: 토큰의 주체 (프로바이더 고유 ID)
/// - `iat`: 발급 시간 (Unix timestamp)
/// - `exp`: 만료 시간 (Unix timestamp, 발급 + 24시간)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "UserInfo")]
    pub user_info: LinkedProvider,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}
