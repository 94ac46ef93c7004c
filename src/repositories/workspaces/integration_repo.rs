//! # 워크스페이스 통합 기능 리포지토리
//!
//! `workspace_integrations` 컬렉션은 `(workspace, integration)` 쌍에 유니크 인덱스가 걸려 있으며,
//! 활성화/비활성화는 이 쌍에 대한 upsert 한 번으로 처리됩니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{Collection, bson::doc, options::ReturnDocument};
use serde_json::{Map, Value};
use crate::db::{Database, collections};
use crate::domain::entities::workspaces::WorkspaceIntegration;
use crate::errors::{AppError, AppResult};
use crate::repositories::support::{collect, index, map_mongo_error, to_bson};

#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    async fn list(&self, workspace: &str) -> AppResult<Vec<WorkspaceIntegration>>;

    async fn find(&self, workspace: &str, integration: &str) -> AppResult<Option<WorkspaceIntegration>>;

    /// 없으면 만들고, 있으면 `enabled`만 바꿉니다.
    async fn set_enabled(
        &self,
        workspace: &str,
        integration: &str,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> AppResult<WorkspaceIntegration>;

    /// 설정 전체를 교체합니다. 레코드가 없으면 `None`.
    async fn replace_settings(
        &self,
        workspace: &str,
        integration: &str,
        settings: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<WorkspaceIntegration>>;
}

pub struct MongoIntegrationRepository {
    integrations: Collection<WorkspaceIntegration>,
}

impl MongoIntegrationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            integrations: db.collection(collections::WORKSPACE_INTEGRATIONS),
        }
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        self.integrations
            .create_indexes([
                index(doc! { "id": 1 }, "id_unique", true),
                index(doc! { "workspace": 1, "integration": 1 }, "workspace_integration_unique", true),
            ])
            .await
            .map_err(map_mongo_error)?;

        Ok(())
    }
}

#[async_trait]
impl IntegrationRepository for MongoIntegrationRepository {
    async fn list(&self, workspace: &str) -> AppResult<Vec<WorkspaceIntegration>> {
        let cursor = self.integrations
            .find(doc! { "workspace": workspace })
            .await
            .map_err(map_mongo_error)?;

        collect(cursor).await
    }

    async fn find(&self, workspace: &str, integration: &str) -> AppResult<Option<WorkspaceIntegration>> {
        self.integrations
            .find_one(doc! { "workspace": workspace, "integration": integration })
            .await
            .map_err(map_mongo_error)
    }

    async fn set_enabled(
        &self,
        workspace: &str,
        integration: &str,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> AppResult<WorkspaceIntegration> {
        let fresh = WorkspaceIntegration::new(workspace, integration, enabled, now);
        let mut on_insert = mongodb::bson::to_document(&fresh)
            .map_err(|e| AppError::InternalError(format!("bson 변환 실패: {}", e)))?;
        // $set과 같은 필드를 $setOnInsert에 두면 충돌합니다
        on_insert.remove("enabled");
        on_insert.remove("updated_at");

        self.integrations
            .find_one_and_update(
                doc! { "workspace": workspace, "integration": integration },
                doc! {
                    "$set": { "enabled": enabled, "updated_at": to_bson(&now)? },
                    "$setOnInsert": on_insert,
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?
            .ok_or_else(|| AppError::DatabaseError("upsert 결과 문서가 없습니다".to_string()))
    }

    async fn replace_settings(
        &self,
        workspace: &str,
        integration: &str,
        settings: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<WorkspaceIntegration>> {
        self.integrations
            .find_one_and_update(
                doc! { "workspace": workspace, "integration": integration },
                doc! { "$set": { "settings": to_bson(settings)?, "updated_at": to_bson(&now)? } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)
    }
}
