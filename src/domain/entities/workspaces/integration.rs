use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 워크스페이스에 붙은 통합 기능의 활성 상태와 설정
///
/// `(workspace, integration)` 쌍마다 하나만 존재합니다.
/// 처음 활성화/비활성화할 때 만들어지며, 삭제하지 않고 `enabled`만 바꿉니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceIntegration {
    pub id: String,
    pub workspace: String,
    /// 통합 기능 식별자 (예: `leveling`, `welcome`)
    pub integration: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub settings: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceIntegration {
    pub fn new(
        workspace: impl Into<String>,
        integration: impl Into<String>,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            workspace: workspace.into(),
            integration: integration.into(),
            enabled,
            settings: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// 통합 기능 식별자: 영문 소문자, 숫자, `-`, `_`로 된 1-64자
pub fn is_valid_integration_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}
