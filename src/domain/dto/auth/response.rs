//! 인증 응답 DTO

use serde::Serialize;
use crate::domain::dto::workspaces::BotView;
use crate::domain::entities::accounts::{BlacklistEntry, ModerationAction};
use crate::domain::entities::profiles::Profile;
use crate::domain::entities::providers::{ChallengeStatus, LinkedProvider};
use crate::domain::entities::workspaces::{Workspace, WorkspaceMember};

/// 조정 결과 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileAction {
    Created,
    Updated,
}

/// 콜백 완료 응답 (리다이렉트가 등록되지 않은 경우)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkResponse {
    pub action: ReconcileAction,
    pub provider: LinkedProvider,
}

/// Roblox 검증 문구 발급 응답
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeIssued {
    pub code: String,
    pub username: String,
    pub provider_id: String,
    pub status: ChallengeStatus,
}

/// `GET /auth/status` 응답
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacklist: Option<BlacklistEntry>,
}

/// 멤버십과 해당 워크스페이스
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MembershipExport {
    #[serde(flatten)]
    pub membership: WorkspaceMember,
    pub workspace: Option<Workspace>,
}

/// `GET /auth/gdpr` 내보내기 파일
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GdprExport {
    pub auth_providers: Vec<LinkedProvider>,
    pub blacklist: Vec<BlacklistEntry>,
    pub profile: Option<Profile>,
    pub bot_moderation_actions: Vec<ModerationAction>,
    pub workspace_memberships: Vec<MembershipExport>,
    pub workspaces: Vec<Workspace>,
    /// 토큰은 내보내지 않습니다
    pub bots: Vec<BotView>,
}
