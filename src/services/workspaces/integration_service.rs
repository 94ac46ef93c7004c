//! 워크스페이스 통합 기능 서비스
//!
//! 활성화/비활성화는 `(workspace, integration)` 쌍에 대한 upsert이며,
//! 변경은 `owner`, `admin`만 할 수 있습니다.

use std::sync::Arc;
use chrono::Utc;
use crate::domain::dto::workspaces::UpdateIntegrationRequest;
use crate::domain::entities::workspaces::{is_valid_integration_id, WorkspaceIntegration, WorkspaceMember};
use crate::errors::{AppError, AppResult};
use crate::repositories::IntegrationRepository;
use crate::services::workspaces::workspace_service::require_manager;

fn check_id(integration: &str) -> AppResult<()> {
    if is_valid_integration_id(integration) {
        Ok(())
    } else {
        Err(AppError::ValidationError("Invalid integration ID".to_string()))
    }
}

pub struct IntegrationService {
    integrations: Arc<dyn IntegrationRepository>,
}

impl IntegrationService {
    pub fn new(integrations: Arc<dyn IntegrationRepository>) -> Self {
        Self { integrations }
    }

    pub async fn list(&self, workspace_id: &str) -> AppResult<Vec<WorkspaceIntegration>> {
        self.integrations.list(workspace_id).await
    }

    /// # Errors
    ///
    /// 한 번도 켜거나 끈 적 없는 통합 기능이면 `NotFound("Integration not found")`.
    pub async fn get(&self, workspace_id: &str, integration: &str) -> AppResult<WorkspaceIntegration> {
        check_id(integration)?;
        self.integrations
            .find(workspace_id, integration)
            .await?
            .ok_or_else(|| AppError::NotFound("Integration not found".to_string()))
    }

    pub async fn enable(
        &self,
        actor: &WorkspaceMember,
        workspace_id: &str,
        integration: &str,
    ) -> AppResult<WorkspaceIntegration> {
        self.set_enabled(actor, workspace_id, integration, true).await
    }

    pub async fn disable(
        &self,
        actor: &WorkspaceMember,
        workspace_id: &str,
        integration: &str,
    ) -> AppResult<WorkspaceIntegration> {
        self.set_enabled(actor, workspace_id, integration, false).await
    }

    async fn set_enabled(
        &self,
        actor: &WorkspaceMember,
        workspace_id: &str,
        integration: &str,
        enabled: bool,
    ) -> AppResult<WorkspaceIntegration> {
        require_manager(actor)?;
        check_id(integration)?;

        let row = self.integrations.set_enabled(workspace_id, integration, enabled, Utc::now()).await?;
        log::info!("통합 기능 {}: {} / {}", if enabled { "활성화" } else { "비활성화" }, workspace_id, integration);
        Ok(row)
    }

    /// 설정 객체 전체를 교체합니다.
    ///
    /// # Arguments
    ///
    /// * `actor` - 요청자의 멤버십 (관리 권한 필요)
    /// * `workspace_id` - 워크스페이스 ID
    /// * `integration` - 통합 기능 식별자
    /// * `request` - 새 설정
    ///
    /// # Returns
    ///
    /// 교체된 레코드
    ///
    /// # Errors
    ///
    /// * `AuthorizationError` - 관리 권한 없음
    /// * `NotFound` - 레코드 없음
    pub async fn update_settings(
        &self,
        actor: &WorkspaceMember,
        workspace_id: &str,
        integration: &str,
        request: UpdateIntegrationRequest,
    ) -> AppResult<WorkspaceIntegration> {
        require_manager(actor)?;
        check_id(integration)?;

        self.integrations
            .replace_settings(workspace_id, integration, &request.settings, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Integration not found".to_string()))
    }
}
