//! # 워크스페이스 서비스
//!
//! 워크스페이스 생성/수정과 멤버 관리를 담당합니다.
//!
//! ## 생성 순서
//!
//! ```text
//! 1. 요금제 확인 (유료면 결제 고객 필요)
//! 2. 구독 생성         ← 유료 요금제만
//! 3. 워크스페이스 저장  ← 실패 시 구독 취소
//! 4. owner 멤버십 저장 ← 실패 시 워크스페이스 삭제, 구독 취소
//! ```
//!
//! ## 권한
//!
//! - 수정, 멤버 추가, 역할 변경: `owner`, `admin`
//! - 멤버 제거: `owner`, `admin` 또는 본인 (owner는 제거할 수 없음)
//! - `owner` 역할은 생성 시에만 부여됩니다.

use std::sync::Arc;
use chrono::Utc;
use crate::clients::BillingApi;
use crate::config::BillingConfig;
use crate::domain::dto::workspaces::{AddMemberRequest, CreateWorkspaceRequest, UpdateMemberRequest, UpdateWorkspaceRequest};
use crate::domain::entities::profiles::Profile;
use crate::domain::entities::workspaces::{Plan, Visibility, Workspace, WorkspaceMember, WorkspaceRole};
use crate::errors::{AppError, AppResult};
use crate::repositories::{ProfileRepository, WorkspaceRepository};

fn parse_visibility(value: Option<&str>) -> AppResult<Visibility> {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("private") => Ok(Visibility::Private),
        Some("public") => Ok(Visibility::Public),
        Some(other) => Err(AppError::ValidationError(format!("Unknown visibility: {}", other))),
    }
}

/// `owner`가 아닌 역할만 허용합니다.
fn assignable_role(value: &str) -> AppResult<WorkspaceRole> {
    match WorkspaceRole::from_str(value).map_err(AppError::ValidationError)? {
        WorkspaceRole::Owner => Err(AppError::ValidationError("The owner role cannot be assigned".to_string())),
        role => Ok(role),
    }
}

pub(crate) fn require_manager(actor: &WorkspaceMember) -> AppResult<()> {
    if actor.role.can_manage() {
        Ok(())
    } else {
        Err(AppError::AuthorizationError(
            "You do not have permission to manage this workspace".to_string(),
        ))
    }
}

pub struct WorkspaceService {
    workspaces: Arc<dyn WorkspaceRepository>,
    profiles: Arc<dyn ProfileRepository>,
    billing: Arc<dyn BillingApi>,
    config: BillingConfig,
}

impl WorkspaceService {
    /// # Arguments
    ///
    /// * `config` - 요금제별 가격 ID
    pub fn new(
        workspaces: Arc<dyn WorkspaceRepository>,
        profiles: Arc<dyn ProfileRepository>,
        billing: Arc<dyn BillingApi>,
        config: BillingConfig,
    ) -> Self {
        Self { workspaces, profiles, billing, config }
    }

    /// 멤버십을 통해 사용자가 속한 워크스페이스를 조회합니다.
    pub async fn list(&self, profile_id: &str) -> AppResult<Vec<Workspace>> {
        let ids: Vec<String> = self.workspaces
            .memberships_for_profile(profile_id)
            .await?
            .into_iter()
            .map(|m| m.workspace)
            .collect();

        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.workspaces.find_workspaces(&ids).await
    }

    fn price_for(&self, plan: Plan) -> Option<&str> {
        match plan {
            Plan::Free => None,
            Plan::Starter => Some(self.config.starter_price_id.as_str()),
            Plan::Pro => Some(self.config.pro_price_id.as_str()),
        }
    }

    /// 워크스페이스를 만들고 요청자를 `owner`로 등록합니다.
    ///
    /// # Arguments
    ///
    /// * `owner` - 요청자 프로필 (유료 요금제는 결제 고객 ID 필요)
    /// * `request` - 이름, 설명, 공개 범위, 요금제
    ///
    /// # Returns
    ///
    /// 저장된 워크스페이스
    ///
    /// # Errors
    ///
    /// * `ValidationError` - 알 수 없는 요금제/공개 범위, 결제 고객 없음
    /// * `ExternalServiceError` - 구독 생성 실패
    /// * 저장소 에러 (앞 단계는 되돌린 뒤 전달)
    pub async fn create(&self, owner: &Profile, request: CreateWorkspaceRequest) -> AppResult<Workspace> {
        let plan = Plan::from_str(&request.plan).map_err(AppError::ValidationError)?;
        let visibility = parse_visibility(request.visibility.as_deref())?;

        let subscription = match self.price_for(plan) {
            Some(price) => {
                let customer = owner.stripe_customer_id.as_deref().ok_or_else(|| {
                    AppError::ValidationError("A billing account is required for paid plans".to_string())
                })?;
                let subscription = self.billing.create_subscription(customer, price).await?;
                log::info!("구독 생성: {} ({} / {})", subscription.id, owner.id, plan.as_str());
                Some(subscription.id)
            }
            None => None,
        };

        let workspace = Workspace::new(
            &owner.id,
            request.name.trim(),
            request.description,
            visibility,
            plan,
            subscription.clone(),
            Utc::now(),
        );

        let workspace = match self.workspaces.insert_workspace(&workspace).await {
            Ok(workspace) => workspace,
            Err(e) => {
                self.cancel_subscription(subscription.as_deref()).await;
                return Err(e);
            }
        };

        let owner_member = WorkspaceMember::new(&workspace.id, &owner.id, WorkspaceRole::Owner, Utc::now());
        if let Err(e) = self.workspaces.insert_member(&owner_member).await {
            log::warn!("owner 멤버십 저장 실패, 워크스페이스 {} 롤백: {}", workspace.id, e);
            if let Err(rollback) = self.workspaces.delete_workspace(&workspace.id).await {
                log::error!("워크스페이스 롤백 실패 ({}): {}", workspace.id, rollback);
            }
            self.cancel_subscription(subscription.as_deref()).await;
            return Err(e);
        }

        log::info!("워크스페이스 생성: {} (owner: {})", workspace.id, owner.id);
        Ok(workspace)
    }

    async fn cancel_subscription(&self, subscription: Option<&str>) {
        let Some(subscription) = subscription else {
            return;
        };
        match self.billing.cancel_subscription(subscription).await {
            Ok(()) => log::info!("구독 롤백: {}", subscription),
            Err(e) => log::error!("구독 롤백 실패 ({}): {}", subscription, e),
        }
    }

    pub async fn get(&self, workspace_id: &str) -> AppResult<Workspace> {
        self.workspaces
            .find_workspace(workspace_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Workspace not found".to_string()))
    }

    /// 요청자의 멤버십. 멤버가 아니면 `AuthorizationError`.
    pub async fn membership(&self, workspace_id: &str, profile_id: &str) -> AppResult<WorkspaceMember> {
        self.workspaces
            .find_member(workspace_id, profile_id)
            .await?
            .ok_or_else(|| AppError::AuthorizationError("You are not a member of this workspace".to_string()))
    }

    /// # Errors
    ///
    /// * `AuthorizationError` - `owner`, `admin`이 아님
    /// * `ValidationError` - 알 수 없는 공개 범위
    pub async fn update(
        &self,
        actor: &WorkspaceMember,
        workspace: &Workspace,
        request: UpdateWorkspaceRequest,
    ) -> AppResult<Workspace> {
        require_manager(actor)?;

        let mut updated = workspace.clone();
        if let Some(name) = request.name {
            updated.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            updated.settings.description = description;
        }
        if request.visibility.is_some() {
            updated.visibility = parse_visibility(request.visibility.as_deref())?;
        }
        updated.updated_at = Utc::now();

        self.workspaces.update_workspace(&updated).await
    }

    pub async fn members(&self, workspace_id: &str) -> AppResult<Vec<WorkspaceMember>> {
        self.workspaces.members_of(workspace_id).await
    }

    /// Discord ID로 프로필을 찾아 초대 상태(`pending`)의 멤버로 추가합니다.
    pub async fn add_member(
        &self,
        actor: &WorkspaceMember,
        workspace: &Workspace,
        request: AddMemberRequest,
    ) -> AppResult<WorkspaceMember> {
        require_manager(actor)?;
        let role = assignable_role(&request.role)?;

        let profile = self.profiles
            .find_by_discord_id(request.discord.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let mut member = WorkspaceMember::new(&workspace.id, &profile.id, role, Utc::now());
        member.pending = true;

        let member = self.workspaces.insert_member(&member).await.map_err(|e| match e {
            AppError::DuplicateKey(_) => {
                AppError::ConflictError("User is already a member of this workspace".to_string())
            }
            other => other,
        })?;

        log::info!("멤버 추가: {} → {} ({:?})", profile.id, workspace.id, role);
        Ok(member)
    }

    pub async fn get_member(&self, workspace_id: &str, profile_id: &str) -> AppResult<WorkspaceMember> {
        self.workspaces
            .find_member(workspace_id, profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Workspace member not found".to_string()))
    }

    /// 멤버 역할을 바꿉니다. `owner`의 역할과 `owner`로의 변경은 막습니다.
    pub async fn update_member(
        &self,
        actor: &WorkspaceMember,
        workspace_id: &str,
        profile_id: &str,
        request: UpdateMemberRequest,
    ) -> AppResult<WorkspaceMember> {
        require_manager(actor)?;
        let role = assignable_role(&request.role)?;

        let mut member = self.get_member(workspace_id, profile_id).await?;
        if member.role == WorkspaceRole::Owner {
            return Err(AppError::AuthorizationError("The owner's role cannot be changed".to_string()));
        }

        member.role = role;
        self.workspaces.update_member(&member).await
    }

    /// # Errors
    ///
    /// * `NotFound` - 멤버가 아님
    /// * `AuthorizationError` - `owner`를 제거하려 하거나, 관리 권한 없이 다른 멤버를 제거함
    pub async fn remove_member(&self, actor: &WorkspaceMember, workspace_id: &str, profile_id: &str) -> AppResult<()> {
        let member = self.get_member(workspace_id, profile_id).await?;

        if member.role == WorkspaceRole::Owner {
            return Err(AppError::AuthorizationError("The workspace owner cannot be removed".to_string()));
        }
        if actor.profile != member.profile {
            require_manager(actor)?;
        }

        self.workspaces.delete_member(workspace_id, profile_id).await?;
        log::info!("멤버 제거: {} ← {} (요청자: {})", workspace_id, profile_id, actor.profile);
        Ok(())
    }
}
