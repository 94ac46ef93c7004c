//! 워크스페이스 요청 DTO
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

/// 워크스페이스 생성 요청
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkspaceRequest {
    #[validate(length(min = 1, max = 64, message = "name must be 1-64 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    pub description: String,

    /// `public` 또는 `private` (기본값 private)
    #[serde(default)]
    pub visibility: Option<String>,

    /// `free`, `starter`, `pro`
    #[validate(length(min = 1, message = "plan is required"))]
    pub plan: String,
}

/// 워크스페이스 수정 요청
///
/// 요금제 변경은 결제 흐름을 타야 하므로 여기서 받지 않습니다.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWorkspaceRequest {
    #[validate(length(min = 1, max = 64, message = "name must be 1-64 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    pub description: Option<String>,

    pub visibility: Option<String>,
}

/// 멤버 추가 요청
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// 추가할 사용자의 Discord ID
    #[validate(length(min = 1, message = "discord id is required"))]
    pub discord: String,

    #[serde(default = "default_role")]
    pub role: String,
}

/// 멤버 역할 변경 요청
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, message = "role is required"))]
    pub role: String,
}

fn default_role() -> String {
    "member".to_string()
}

/// 봇 등록/수정 요청
///
/// `settings`는 주어진 최상위 키만 현재 설정 위에 덮어씁니다.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BotRequest {
    /// 봇 토큰. 등록 시 필수이며, 수정 시 주면 다시 검증합니다.
    #[validate(length(min = 1, max = 128, message = "token must be 1-128 characters"))]
    pub token: Option<String>,

    #[validate(length(min = 1, max = 32, message = "region must be 1-32 characters"))]
    pub region: Option<String>,

    #[serde(default)]
    pub settings: Option<Map<String, Value>>,

    #[serde(default)]
    pub permissions: Option<Value>,
}

/// 통합 기능 설정 교체 요청
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateIntegrationRequest {
    pub settings: Map<String, Value>,
}
