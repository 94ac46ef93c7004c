//! # 워크스페이스 리포지토리
//!
//! `workspaces`, `workspace_members` 컬렉션에 대한 계약과 MongoDB 구현입니다.
//! 멤버는 `(workspace, profile)` 쌍으로 식별되며, 이 쌍에는 유니크 인덱스가 걸려 있습니다.

use async_trait::async_trait;
use mongodb::{Collection, bson::doc};
use crate::db::{Database, collections};
use crate::domain::entities::workspaces::{Workspace, WorkspaceMember};
use crate::errors::{AppError, AppResult};
use crate::repositories::support::{collect, index, map_mongo_error};

#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn insert_workspace(&self, workspace: &Workspace) -> AppResult<Workspace>;

    async fn find_workspace(&self, id: &str) -> AppResult<Option<Workspace>>;

    async fn find_workspaces(&self, ids: &[String]) -> AppResult<Vec<Workspace>>;

    async fn update_workspace(&self, workspace: &Workspace) -> AppResult<Workspace>;

    async fn delete_workspace(&self, id: &str) -> AppResult<bool>;

    async fn memberships_for_profile(&self, profile: &str) -> AppResult<Vec<WorkspaceMember>>;

    async fn members_of(&self, workspace: &str) -> AppResult<Vec<WorkspaceMember>>;

    async fn find_member(&self, workspace: &str, profile: &str) -> AppResult<Option<WorkspaceMember>>;

    /// 이미 멤버이면 `DuplicateKey`.
    async fn insert_member(&self, member: &WorkspaceMember) -> AppResult<WorkspaceMember>;

    async fn update_member(&self, member: &WorkspaceMember) -> AppResult<WorkspaceMember>;

    async fn delete_member(&self, workspace: &str, profile: &str) -> AppResult<bool>;

    async fn delete_memberships_for_profile(&self, profile: &str) -> AppResult<u64>;
}

pub struct MongoWorkspaceRepository {
    workspaces: Collection<Workspace>,
    members: Collection<WorkspaceMember>,
}

impl MongoWorkspaceRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            workspaces: db.collection(collections::WORKSPACES),
            members: db.collection(collections::WORKSPACE_MEMBERS),
        }
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        self.workspaces
            .create_indexes([
                index(doc! { "id": 1 }, "id_unique", true),
                index(doc! { "owner": 1 }, "owner", false),
            ])
            .await
            .map_err(map_mongo_error)?;

        self.members
            .create_indexes([
                index(doc! { "id": 1 }, "id_unique", true),
                index(doc! { "workspace": 1, "profile": 1 }, "workspace_profile_unique", true),
                index(doc! { "profile": 1 }, "profile", false),
            ])
            .await
            .map_err(map_mongo_error)?;

        Ok(())
    }
}

#[async_trait]
impl WorkspaceRepository for MongoWorkspaceRepository {
    async fn insert_workspace(&self, workspace: &Workspace) -> AppResult<Workspace> {
        self.workspaces
            .insert_one(workspace)
            .await
            .map_err(map_mongo_error)?;

        Ok(workspace.clone())
    }

    async fn find_workspace(&self, id: &str) -> AppResult<Option<Workspace>> {
        self.workspaces
            .find_one(doc! { "id": id })
            .await
            .map_err(map_mongo_error)
    }

    async fn find_workspaces(&self, ids: &[String]) -> AppResult<Vec<Workspace>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self.workspaces
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await
            .map_err(map_mongo_error)?;

        collect(cursor).await
    }

    async fn update_workspace(&self, workspace: &Workspace) -> AppResult<Workspace> {
        let result = self.workspaces
            .replace_one(doc! { "id": &workspace.id }, workspace)
            .await
            .map_err(map_mongo_error)?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound("Workspace not found".to_string()));
        }

        Ok(workspace.clone())
    }

    async fn delete_workspace(&self, id: &str) -> AppResult<bool> {
        let result = self.workspaces
            .delete_one(doc! { "id": id })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn memberships_for_profile(&self, profile: &str) -> AppResult<Vec<WorkspaceMember>> {
        let cursor = self.members
            .find(doc! { "profile": profile })
            .await
            .map_err(map_mongo_error)?;

        collect(cursor).await
    }

    async fn members_of(&self, workspace: &str) -> AppResult<Vec<WorkspaceMember>> {
        let cursor = self.members
            .find(doc! { "workspace": workspace })
            .await
            .map_err(map_mongo_error)?;

        collect(cursor).await
    }

    async fn find_member(&self, workspace: &str, profile: &str) -> AppResult<Option<WorkspaceMember>> {
        self.members
            .find_one(doc! { "workspace": workspace, "profile": profile })
            .await
            .map_err(map_mongo_error)
    }

    async fn insert_member(&self, member: &WorkspaceMember) -> AppResult<WorkspaceMember> {
        self.members
            .insert_one(member)
            .await
            .map_err(map_mongo_error)?;

        Ok(member.clone())
    }

    async fn update_member(&self, member: &WorkspaceMember) -> AppResult<WorkspaceMember> {
        let result = self.members
            .replace_one(doc! { "id": &member.id }, member)
            .await
            .map_err(map_mongo_error)?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound("Member not found".to_string()));
        }

        Ok(member.clone())
    }

    async fn delete_member(&self, workspace: &str, profile: &str) -> AppResult<bool> {
        let result = self.members
            .delete_one(doc! { "workspace": workspace, "profile": profile })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn delete_memberships_for_profile(&self, profile: &str) -> AppResult<u64> {
        let result = self.members
            .delete_many(doc! { "profile": profile })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count)
    }
}
