//! # 계정 서비스
//!
//! 로그인 이후 사용자가 자기 계정에 대해 수행하는 작업을 담당합니다.
//!
//! - 프로필 및 연결된 프로바이더 조회
//! - Discord 프로필 새로고침 (저장된 액세스 토큰 사용)
//! - 블랙리스트 상태 조회
//! - GDPR 데이터 내보내기
//! - 계정 삭제
//!
//! 계정 삭제는 멤버십 → 봇 → 프로필 → 프로바이더 순서로 진행합니다.
//! 세션 토큰이 가리키는 프로바이더 레코드를 마지막에 지워야
//! 도중에 실패해도 같은 세션으로 다시 시도할 수 있습니다.

use std::sync::Arc;
use chrono::Utc;
use crate::clients::DiscordApi;
use crate::config::AuthProvider;
use crate::domain::dto::auth::{AccountStatus, GdprExport, MembershipExport};
use crate::domain::dto::workspaces::BotView;
use crate::domain::entities::profiles::Profile;
use crate::domain::entities::providers::LinkedProvider;
use crate::domain::models::auth::AuthenticatedUser;
use crate::errors::{AppError, AppResult};
use crate::repositories::{
    AccountRepository, BotRepository, ProfileRepository, ProviderRepository, WorkspaceRepository,
};

pub struct AccountService {
    providers: Arc<dyn ProviderRepository>,
    profiles: Arc<dyn ProfileRepository>,
    accounts: Arc<dyn AccountRepository>,
    workspaces: Arc<dyn WorkspaceRepository>,
    bots: Arc<dyn BotRepository>,
    discord: Arc<dyn DiscordApi>,
    cdn_base: String,
}

impl AccountService {
    /// # Arguments
    ///
    /// * `cdn_base` - Discord 아바타/배너 URL을 만들 CDN 주소
    pub fn new(
        providers: Arc<dyn ProviderRepository>,
        profiles: Arc<dyn ProfileRepository>,
        accounts: Arc<dyn AccountRepository>,
        workspaces: Arc<dyn WorkspaceRepository>,
        bots: Arc<dyn BotRepository>,
        discord: Arc<dyn DiscordApi>,
        cdn_base: impl Into<String>,
    ) -> Self {
        Self {
            providers,
            profiles,
            accounts,
            workspaces,
            bots,
            discord,
            cdn_base: cdn_base.into(),
        }
    }

    /// 사용자 프로필을 조회합니다. 없으면 `NotFound`.
    pub async fn profile(&self, user_id: &str) -> AppResult<Profile> {
        self.profiles
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    pub async fn linked_providers(&self, user_id: &str) -> AppResult<Vec<LinkedProvider>> {
        self.providers.list_by_user(user_id).await
    }

    /// 특정 프로바이더 연결을 조회합니다.
    ///
    /// 연결되어 있지 않거나 알 수 없는 프로바이더 이름이면 `None`.
    pub async fn linked_provider(&self, user_id: &str, provider: &str) -> AppResult<Option<LinkedProvider>> {
        let Ok(provider) = AuthProvider::from_str(provider) else {
            return Ok(None);
        };
        self.providers.find_by_user_and_type(user_id, provider).await
    }

    /// 저장된 액세스 토큰으로 Discord 프로필을 다시 읽어
    /// 연결 레코드와 프로필을 갱신합니다.
    ///
    /// # Arguments
    ///
    /// * `user` - 세션 사용자
    /// * `provider` - 경로의 프로바이더 이름 (`discord`만 지원)
    ///
    /// # Returns
    ///
    /// 갱신된 Discord 연결 레코드
    ///
    /// # Errors
    ///
    /// * `ValidationError` - Discord가 아닌 프로바이더
    /// * `NotFound` - Discord 연결 없음
    /// * `ProviderError("Invalid token")` - 저장된 토큰이 없거나 Discord가 거부함
    pub async fn refresh_provider(&self, user: &AuthenticatedUser, provider: &str) -> AppResult<LinkedProvider> {
        if AuthProvider::from_str(provider) != Ok(AuthProvider::Discord) {
            return Err(AppError::ValidationError("Provider not supported".to_string()));
        }

        let mut record = self.providers
            .find_by_user_and_type(&user.user_id, AuthProvider::Discord)
            .await?
            .ok_or_else(|| AppError::NotFound("Provider not found".to_string()))?;

        let access_token = record.provider_access_token.clone()
            .ok_or_else(|| AppError::ProviderError("Invalid token".to_string()))?;

        let discord_user = self.discord.fetch_current_user(&access_token).await.map_err(|e| {
            log::warn!("Discord 프로필 새로고침 실패 ({}): {}", user.user_id, e);
            AppError::ProviderError("Invalid token".to_string())
        })?;

        let now = Utc::now();
        let identity = discord_user.into_identity(None, &self.cdn_base, now);

        record.provider_avatar_url = identity.avatar_url.clone();
        record.provider_email = identity.email.clone();
        record.provider_data = identity.data.clone();
        record.updated_at = now;
        let record = self.providers.update(&record).await?;

        let mut profile = self.profile(&user.user_id).await?;
        profile.mirror_anchor(&identity, now);
        self.profiles.update(&profile).await?;

        log::info!("Discord 프로필 새로고침 완료: {}", user.user_id);
        Ok(record)
    }

    /// 만료되지 않은 블랙리스트 항목이 있으면 함께 돌려줍니다.
    pub async fn status(&self, user_id: &str) -> AppResult<AccountStatus> {
        let now = Utc::now();
        let blacklist = self.accounts
            .blacklist_for_user(user_id)
            .await?
            .into_iter()
            .find(|entry| entry.expires_at.is_none_or(|expires| expires > now));

        Ok(AccountStatus { authenticated: true, blacklist })
    }

    /// 사용자에 관한 모든 레코드를 모읍니다.
    ///
    /// 봇 토큰은 내보내지 않습니다.
    pub async fn export(&self, user_id: &str) -> AppResult<GdprExport> {
        let auth_providers = self.providers.list_by_user(user_id).await?;
        let blacklist = self.accounts.blacklist_for_user(user_id).await?;
        let profile = self.profiles.find_by_id(user_id).await?;
        let bot_moderation_actions = self.accounts.moderation_actions_for_user(user_id).await?;
        let bots = self.bots.for_owner(user_id).await?.into_iter().map(BotView::from).collect();

        let memberships = self.workspaces.memberships_for_profile(user_id).await?;
        let ids: Vec<String> = memberships.iter().map(|m| m.workspace.clone()).collect();
        let workspaces = self.workspaces.find_workspaces(&ids).await?;

        let workspace_memberships = memberships
            .into_iter()
            .map(|membership| {
                let workspace = workspaces.iter().find(|w| w.id == membership.workspace).cloned();
                MembershipExport { membership, workspace }
            })
            .collect();

        log::info!("GDPR 데이터 내보내기: {}", user_id);

        Ok(GdprExport {
            auth_providers,
            blacklist,
            profile,
            bot_moderation_actions,
            workspace_memberships,
            workspaces,
            bots,
        })
    }

    /// # Errors
    ///
    /// 저장소 에러를 그대로 전달합니다. 중간에 실패하면 같은 세션으로 다시 호출할 수 있습니다.
    pub async fn delete_account(&self, user_id: &str) -> AppResult<()> {
        let memberships = self.workspaces.delete_memberships_for_profile(user_id).await?;
        let bots = self.bots.delete_for_owner(user_id).await?;
        self.profiles.delete(user_id).await?;
        let providers = self.providers.delete_by_user(user_id).await?;

        log::info!(
            "계정 삭제 완료: {} (멤버십 {}, 봇 {}, 프로바이더 {})",
            user_id, memberships, bots, providers
        );
        Ok(())
    }
}
