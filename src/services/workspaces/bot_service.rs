//! # 워크스페이스 봇 서비스
//!
//! 워크스페이스마다 봇 하나를 등록하고, 설정과 사용량 기록을 다룹니다.
//!
//! ## 등록 순서
//!
//! ```text
//! 1. 관리 권한 확인
//! 2. 기존 봇 확인              ← 있으면 ConflictError
//! 3. Discord로 토큰 확인       ← 거부되면 UnprocessableEntity("Invalid token")
//! 4. 기본 설정 위에 요청 설정 병합 후 저장
//! ```
//!
//! 토큰은 저장만 하고 응답에는 싣지 않습니다. 조회와 사용량 확인은 멤버면 충분하고,
//! 등록/수정/삭제는 `owner`, `admin`만 할 수 있습니다.

use std::sync::Arc;
use chrono::Utc;
use serde_json::{Map, Value};
use crate::clients::DiscordApi;
use crate::domain::dto::workspaces::BotRequest;
use crate::domain::entities::bots::{Bot, BotAnalytics, BotSettings};
use crate::domain::entities::workspaces::{Workspace, WorkspaceMember};
use crate::errors::{AppError, AppResult};
use crate::repositories::BotRepository;
use crate::services::workspaces::workspace_service::require_manager;

pub struct BotService {
    bots: Arc<dyn BotRepository>,
    discord: Arc<dyn DiscordApi>,
}

impl BotService {
    pub fn new(bots: Arc<dyn BotRepository>, discord: Arc<dyn DiscordApi>) -> Self {
        Self { bots, discord }
    }

    /// 워크스페이스의 봇을 조회합니다.
    ///
    /// # Errors
    ///
    /// 봇이 없으면 `NotFound("Bot not found")`.
    pub async fn get(&self, workspace_id: &str) -> AppResult<Bot> {
        self.bots
            .find_by_workspace(workspace_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Bot not found".to_string()))
    }

    /// 토큰을 확인한 뒤 워크스페이스에 봇을 등록합니다.
    ///
    /// # Arguments
    ///
    /// * `actor` - 요청자의 멤버십
    /// * `owner` - 봇 소유자로 기록할 앵커 사용자 ID
    /// * `workspace` - 봇을 붙일 워크스페이스
    /// * `request` - 토큰(필수), 리전, 설정, 권한
    ///
    /// # Returns
    ///
    /// 저장된 봇
    ///
    /// # Errors
    ///
    /// * `AuthorizationError` - 관리 권한 없음
    /// * `ValidationError` - 토큰 누락 또는 잘못된 설정
    /// * `ConflictError` - 이미 봇이 있음
    /// * `UnprocessableEntity` - Discord가 토큰을 거부함
    pub async fn create(
        &self,
        actor: &WorkspaceMember,
        owner: &str,
        workspace: &Workspace,
        request: BotRequest,
    ) -> AppResult<Bot> {
        require_manager(actor)?;

        let token = request.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::ValidationError("token is required".to_string()))?
            .to_string();

        if self.bots.find_by_workspace(&workspace.id).await?.is_some() {
            return Err(already_has_bot());
        }

        let account = self.discord.fetch_bot_user(&token).await?;
        let settings = merge_settings(&BotSettings::default(), request.settings.as_ref())?;

        let mut bot = Bot::new(&workspace.id, owner, token, settings, Utc::now());
        bot.discord_id = Some(account.id);
        bot.region = request.region;
        if let Some(permissions) = request.permissions {
            bot.permissions = permissions;
        }

        let bot = self.bots.insert(&bot).await.map_err(|e| match e {
            AppError::DuplicateKey(_) => already_has_bot(),
            other => other,
        })?;

        log::info!("봇 등록: {} → {} (소유자: {})", bot.id, workspace.id, owner);
        Ok(bot)
    }

    /// 주어진 값만 바꿉니다. 새 토큰은 저장 전에 다시 확인합니다.
    ///
    /// # Errors
    ///
    /// `create`와 같은 분류를 따르며, 기존 봇이 사라졌으면 `NotFound`.
    pub async fn update(&self, actor: &WorkspaceMember, bot: &Bot, request: BotRequest) -> AppResult<Bot> {
        require_manager(actor)?;

        let mut updated = bot.clone();

        if let Some(token) = request.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if token != bot.token {
                let account = self.discord.fetch_bot_user(token).await?;
                updated.discord_id = Some(account.id);
                updated.token = token.to_string();
            }
        }
        if let Some(region) = request.region {
            updated.region = Some(region);
        }
        if let Some(permissions) = request.permissions {
            updated.permissions = permissions;
        }
        updated.settings = merge_settings(&bot.settings, request.settings.as_ref())?;
        updated.updated_at = Utc::now();

        self.bots.update(&updated).await
    }

    pub async fn delete(&self, actor: &WorkspaceMember, bot: &Bot) -> AppResult<()> {
        require_manager(actor)?;

        if !self.bots.delete(&bot.workspace, &bot.id).await? {
            return Err(AppError::NotFound("Bot not found".to_string()));
        }
        log::info!("봇 삭제: {} ← {} (요청자: {})", bot.workspace, bot.id, actor.profile);
        Ok(())
    }

    /// 봇 사용량 기록, 최신순.
    ///
    /// # Returns
    ///
    /// 워크스페이스에 봇이 없으면 `None`
    pub async fn analytics(&self, workspace_id: &str) -> AppResult<Option<Vec<BotAnalytics>>> {
        let Some(bot) = self.bots.find_by_workspace(workspace_id).await? else {
            return Ok(None);
        };

        let mut rows = self.bots.analytics_for(&bot.id).await?;
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(Some(rows))
    }
}

fn already_has_bot() -> AppError {
    AppError::ConflictError("This workspace already has a bot".to_string())
}

fn merge_settings(current: &BotSettings, patch: Option<&Map<String, Value>>) -> AppResult<BotSettings> {
    match patch {
        Some(patch) => current.merged(patch).map_err(AppError::ValidationError),
        None => Ok(current.clone()),
    }
}
