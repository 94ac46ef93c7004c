//! 인메모리 리포지토리 구현
//!
//! MongoDB 구현과 같은 유니크 제약을 흉내 내어, 서비스 테스트가 실제 저장소 없이
//! 중복 처리와 경쟁 조건 경로까지 검증할 수 있게 합니다.

use std::sync::RwLock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::config::AuthProvider;
use serde_json::{Map, Value};
use crate::domain::entities::accounts::{BlacklistEntry, ModerationAction};
use crate::domain::entities::bots::{Bot, BotAnalytics};
use crate::domain::entities::profiles::Profile;
use crate::domain::entities::providers::{LinkedProvider, ProviderData};
use crate::domain::entities::workspaces::{Workspace, WorkspaceIntegration, WorkspaceMember};
use crate::errors::{AppError, AppResult};
use crate::repositories::{
    AccountRepository, BotRepository, IntegrationRepository, ProfileRepository, ProviderRepository,
    WorkspaceRepository,
};
use crate::repositories::support::{read_lock, write_lock};

#[derive(Default)]
pub struct InMemoryProviderRepository {
    rows: RwLock<Vec<LinkedProvider>>,
}

impl InMemoryProviderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 전체 레코드 수
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_unique(rows: &[LinkedProvider], candidate: &LinkedProvider) -> AppResult<()> {
        for row in rows.iter().filter(|row| row.id != candidate.id) {
            if row.user_id == candidate.user_id && row.provider_type == candidate.provider_type {
                return Err(AppError::DuplicateKey("user_type_unique".to_string()));
            }
            if row.provider_type == candidate.provider_type && row.provider_id == candidate.provider_id {
                return Err(AppError::DuplicateKey("type_provider_id_unique".to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderRepository for InMemoryProviderRepository {
    async fn find_by_native_id(&self, provider: AuthProvider, native_id: &str) -> AppResult<Option<LinkedProvider>> {
        let rows = read_lock(&self.rows)?;
        Ok(rows.iter()
            .find(|row| row.provider_type == provider && row.provider_id == native_id)
            .cloned())
    }

    async fn find_by_user_and_type(&self, user_id: &str, provider: AuthProvider) -> AppResult<Option<LinkedProvider>> {
        let rows = read_lock(&self.rows)?;
        Ok(rows.iter()
            .find(|row| row.user_id == user_id && row.provider_type == provider)
            .cloned())
    }

    async fn find_by_challenge_code(&self, code: &str) -> AppResult<Option<LinkedProvider>> {
        let rows = read_lock(&self.rows)?;
        Ok(rows.iter()
            .find(|row| row.challenge().is_some_and(|c| c.code == code))
            .cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<LinkedProvider>> {
        let rows = read_lock(&self.rows)?;
        Ok(rows.iter().filter(|row| row.user_id == user_id).cloned().collect())
    }

    async fn insert(&self, provider: &LinkedProvider) -> AppResult<LinkedProvider> {
        let mut provider = provider.clone();
        if provider.id.is_none() {
            provider.id = Some(uuid::Uuid::new_v4().to_string());
        }

        let mut rows = write_lock(&self.rows)?;
        if rows.iter().any(|row| row.id == provider.id) {
            return Err(AppError::DuplicateKey("id_unique".to_string()));
        }
        Self::check_unique(&rows, &provider)?;

        rows.push(provider.clone());
        Ok(provider)
    }

    async fn update(&self, provider: &LinkedProvider) -> AppResult<LinkedProvider> {
        let mut rows = write_lock(&self.rows)?;
        Self::check_unique(&rows, provider)?;

        let row = rows.iter_mut()
            .find(|row| provider.id.is_some() && row.id == provider.id)
            .ok_or_else(|| AppError::NotFound("Provider not found".to_string()))?;

        *row = provider.clone();
        Ok(provider.clone())
    }

    async fn mark_challenge_verified(&self, id: &str, code: &str, now: DateTime<Utc>) -> AppResult<Option<LinkedProvider>> {
        let mut rows = write_lock(&self.rows)?;

        let Some(row) = rows.iter_mut().find(|row| row.id.as_deref() == Some(id)) else {
            return Ok(None);
        };

        let verified = match row.challenge() {
            Some(challenge) if challenge.is_pending() && challenge.code == code => challenge.verified(),
            _ => return Ok(None),
        };

        row.provider_data = ProviderData::Roblox(verified);
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut rows = write_lock(&self.rows)?;
        let before = rows.len();
        rows.retain(|row| row.id.as_deref() != Some(id));
        Ok(rows.len() < before)
    }

    async fn delete_by_user_and_type(&self, user_id: &str, provider: AuthProvider) -> AppResult<bool> {
        let mut rows = write_lock(&self.rows)?;
        let before = rows.len();
        rows.retain(|row| !(row.user_id == user_id && row.provider_type == provider));
        Ok(rows.len() < before)
    }

    async fn delete_by_user(&self, user_id: &str) -> AppResult<u64> {
        let mut rows = write_lock(&self.rows)?;
        let before = rows.len();
        rows.retain(|row| row.user_id != user_id);
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    rows: RwLock<Vec<Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Profile>> {
        let rows = read_lock(&self.rows)?;
        Ok(rows.iter().find(|row| row.id == id).cloned())
    }

    async fn find_by_discord_id(&self, discord_id: &str) -> AppResult<Option<Profile>> {
        let rows = read_lock(&self.rows)?;
        Ok(rows.iter().find(|row| row.discord_id == discord_id).cloned())
    }

    async fn insert(&self, profile: &Profile) -> AppResult<Profile> {
        let mut rows = write_lock(&self.rows)?;
        if rows.iter().any(|row| row.id == profile.id || row.discord_id == profile.discord_id) {
            return Err(AppError::DuplicateKey("profile".to_string()));
        }
        rows.push(profile.clone());
        Ok(profile.clone())
    }

    async fn update(&self, profile: &Profile) -> AppResult<Profile> {
        let mut rows = write_lock(&self.rows)?;
        let row = rows.iter_mut()
            .find(|row| row.id == profile.id)
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
        *row = profile.clone();
        Ok(profile.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut rows = write_lock(&self.rows)?;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() < before)
    }
}

/// 블랙리스트와 모더레이션 기록은 다른 서비스가 기록하므로 시드 메서드로 채웁니다.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    blacklist: RwLock<Vec<BlacklistEntry>>,
    moderation_actions: RwLock<Vec<ModerationAction>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_blacklist(&self, entry: BlacklistEntry) -> AppResult<()> {
        write_lock(&self.blacklist)?.push(entry);
        Ok(())
    }

    pub fn seed_moderation_action(&self, action: ModerationAction) -> AppResult<()> {
        write_lock(&self.moderation_actions)?.push(action);
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn blacklist_for_user(&self, user_id: &str) -> AppResult<Vec<BlacklistEntry>> {
        let rows = read_lock(&self.blacklist)?;
        Ok(rows.iter().filter(|row| row.user == user_id).cloned().collect())
    }

    async fn moderation_actions_for_user(&self, user_id: &str) -> AppResult<Vec<ModerationAction>> {
        let rows = read_lock(&self.moderation_actions)?;
        Ok(rows.iter().filter(|row| row.user == user_id).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryWorkspaceRepository {
    workspaces: RwLock<Vec<Workspace>>,
    members: RwLock<Vec<WorkspaceMember>>,
}

impl InMemoryWorkspaceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workspace_count(&self) -> usize {
        self.workspaces.read().map(|rows| rows.len()).unwrap_or_default()
    }
}

#[async_trait]
impl WorkspaceRepository for InMemoryWorkspaceRepository {
    async fn insert_workspace(&self, workspace: &Workspace) -> AppResult<Workspace> {
        let mut rows = write_lock(&self.workspaces)?;
        if rows.iter().any(|row| row.id == workspace.id) {
            return Err(AppError::DuplicateKey("id_unique".to_string()));
        }
        rows.push(workspace.clone());
        Ok(workspace.clone())
    }

    async fn find_workspace(&self, id: &str) -> AppResult<Option<Workspace>> {
        let rows = read_lock(&self.workspaces)?;
        Ok(rows.iter().find(|row| row.id == id).cloned())
    }

    async fn find_workspaces(&self, ids: &[String]) -> AppResult<Vec<Workspace>> {
        let rows = read_lock(&self.workspaces)?;
        Ok(rows.iter().filter(|row| ids.contains(&row.id)).cloned().collect())
    }

    async fn update_workspace(&self, workspace: &Workspace) -> AppResult<Workspace> {
        let mut rows = write_lock(&self.workspaces)?;
        let row = rows.iter_mut()
            .find(|row| row.id == workspace.id)
            .ok_or_else(|| AppError::NotFound("Workspace not found".to_string()))?;
        *row = workspace.clone();
        Ok(workspace.clone())
    }

    async fn delete_workspace(&self, id: &str) -> AppResult<bool> {
        let mut rows = write_lock(&self.workspaces)?;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() < before)
    }

    async fn memberships_for_profile(&self, profile: &str) -> AppResult<Vec<WorkspaceMember>> {
        let rows = read_lock(&self.members)?;
        Ok(rows.iter().filter(|row| row.profile == profile).cloned().collect())
    }

    async fn members_of(&self, workspace: &str) -> AppResult<Vec<WorkspaceMember>> {
        let rows = read_lock(&self.members)?;
        Ok(rows.iter().filter(|row| row.workspace == workspace).cloned().collect())
    }

    async fn find_member(&self, workspace: &str, profile: &str) -> AppResult<Option<WorkspaceMember>> {
        let rows = read_lock(&self.members)?;
        Ok(rows.iter()
            .find(|row| row.workspace == workspace && row.profile == profile)
            .cloned())
    }

    async fn insert_member(&self, member: &WorkspaceMember) -> AppResult<WorkspaceMember> {
        let mut rows = write_lock(&self.members)?;
        if rows.iter().any(|row| row.workspace == member.workspace && row.profile == member.profile) {
            return Err(AppError::DuplicateKey("workspace_profile_unique".to_string()));
        }
        rows.push(member.clone());
        Ok(member.clone())
    }

    async fn update_member(&self, member: &WorkspaceMember) -> AppResult<WorkspaceMember> {
        let mut rows = write_lock(&self.members)?;
        let row = rows.iter_mut()
            .find(|row| row.id == member.id)
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        *row = member.clone();
        Ok(member.clone())
    }

    async fn delete_member(&self, workspace: &str, profile: &str) -> AppResult<bool> {
        let mut rows = write_lock(&self.members)?;
        let before = rows.len();
        rows.retain(|row| !(row.workspace == workspace && row.profile == profile));
        Ok(rows.len() < before)
    }

    async fn delete_memberships_for_profile(&self, profile: &str) -> AppResult<u64> {
        let mut rows = write_lock(&self.members)?;
        let before = rows.len();
        rows.retain(|row| row.profile != profile);
        Ok((before - rows.len()) as u64)
    }
}

/// 사용량 기록은 봇 런타임이 쓰므로 시드 메서드로 채웁니다.
#[derive(Default)]
pub struct InMemoryBotRepository {
    bots: RwLock<Vec<Bot>>,
    analytics: RwLock<Vec<BotAnalytics>>,
}

impl InMemoryBotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_analytics(&self, entry: BotAnalytics) -> AppResult<()> {
        write_lock(&self.analytics)?.push(entry);
        Ok(())
    }
}

#[async_trait]
impl BotRepository for InMemoryBotRepository {
    async fn find_by_workspace(&self, workspace: &str) -> AppResult<Option<Bot>> {
        let rows = read_lock(&self.bots)?;
        Ok(rows.iter().find(|row| row.workspace == workspace).cloned())
    }

    async fn insert(&self, bot: &Bot) -> AppResult<Bot> {
        let mut rows = write_lock(&self.bots)?;
        if rows.iter().any(|row| row.workspace == bot.workspace) {
            return Err(AppError::DuplicateKey("workspace_unique".to_string()));
        }
        rows.push(bot.clone());
        Ok(bot.clone())
    }

    async fn update(&self, bot: &Bot) -> AppResult<Bot> {
        let mut rows = write_lock(&self.bots)?;
        let row = rows.iter_mut()
            .find(|row| row.id == bot.id)
            .ok_or_else(|| AppError::NotFound("Bot not found".to_string()))?;
        *row = bot.clone();
        Ok(bot.clone())
    }

    async fn delete(&self, workspace: &str, id: &str) -> AppResult<bool> {
        let mut rows = write_lock(&self.bots)?;
        let before = rows.len();
        rows.retain(|row| !(row.workspace == workspace && row.id == id));
        Ok(rows.len() < before)
    }

    async fn for_owner(&self, owner: &str) -> AppResult<Vec<Bot>> {
        let rows = read_lock(&self.bots)?;
        Ok(rows.iter().filter(|row| row.owner == owner).cloned().collect())
    }

    async fn delete_for_owner(&self, owner: &str) -> AppResult<u64> {
        let mut rows = write_lock(&self.bots)?;
        let before = rows.len();
        rows.retain(|row| row.owner != owner);
        Ok((before - rows.len()) as u64)
    }

    async fn analytics_for(&self, bot: &str) -> AppResult<Vec<BotAnalytics>> {
        let rows = read_lock(&self.analytics)?;
        Ok(rows.iter().filter(|row| row.bot == bot).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryIntegrationRepository {
    rows: RwLock<Vec<WorkspaceIntegration>>,
}

impl InMemoryIntegrationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IntegrationRepository for InMemoryIntegrationRepository {
    async fn list(&self, workspace: &str) -> AppResult<Vec<WorkspaceIntegration>> {
        let rows = read_lock(&self.rows)?;
        Ok(rows.iter().filter(|row| row.workspace == workspace).cloned().collect())
    }

    async fn find(&self, workspace: &str, integration: &str) -> AppResult<Option<WorkspaceIntegration>> {
        let rows = read_lock(&self.rows)?;
        Ok(rows.iter()
            .find(|row| row.workspace == workspace && row.integration == integration)
            .cloned())
    }

    async fn set_enabled(
        &self,
        workspace: &str,
        integration: &str,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> AppResult<WorkspaceIntegration> {
        let mut rows = write_lock(&self.rows)?;
        match rows.iter_mut().find(|row| row.workspace == workspace && row.integration == integration) {
            Some(row) => {
                row.enabled = enabled;
                row.updated_at = now;
                Ok(row.clone())
            }
            None => {
                let row = WorkspaceIntegration::new(workspace, integration, enabled, now);
                rows.push(row.clone());
                Ok(row)
            }
        }
    }

    async fn replace_settings(
        &self,
        workspace: &str,
        integration: &str,
        settings: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<WorkspaceIntegration>> {
        let mut rows = write_lock(&self.rows)?;
        Ok(rows.iter_mut()
            .find(|row| row.workspace == workspace && row.integration == integration)
            .map(|row| {
                row.settings = settings.clone();
                row.updated_at = now;
                row.clone()
            }))
    }
}
