use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 블랙리스트 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: String,
    pub user: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// 봇이 사용자에게 내린 모더레이션 조치
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationAction {
    pub id: String,
    pub user: String,
    #[serde(default)]
    pub bot: Option<String>,
    pub action: String,
    #[serde(default)]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
