use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 워크스페이스 내 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Owner,
    Admin,
    Member,
}

impl WorkspaceRole {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(WorkspaceRole::Owner),
            "admin" => Ok(WorkspaceRole::Admin),
            "member" => Ok(WorkspaceRole::Member),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }

    /// 워크스페이스 설정과 멤버 관리를 할 수 있는 역할인지
    pub fn can_manage(&self) -> bool {
        matches!(self, WorkspaceRole::Owner | WorkspaceRole::Admin)
    }
}

/// 워크스페이스 멤버십
///
/// `(workspace, profile)` 쌍마다 하나만 존재합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceMember {
    pub id: String,
    pub workspace: String,
    pub profile: String,
    pub role: WorkspaceRole,
    #[serde(default)]
    pub pending: bool,
    pub created_at: DateTime<Utc>,
}

impl WorkspaceMember {
    pub fn new(workspace: impl Into<String>, profile: impl Into<String>, role: WorkspaceRole, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            workspace: workspace.into(),
            profile: profile.into(),
            role,
            pending: false,
            created_at: now,
        }
    }
}
