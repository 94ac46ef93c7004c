//! # 계정 부가 레코드 리포지토리
//!
//! 블랙리스트와 봇 모더레이션 기록을 사용자 단위로 읽습니다.
//! 이 레코드들은 다른 서비스가 기록하며, 여기서는 상태 확인과 GDPR 내보내기에만 사용합니다.

use async_trait::async_trait;
use mongodb::{Collection, bson::doc};
use crate::db::{Database, collections};
use crate::domain::entities::accounts::{BlacklistEntry, ModerationAction};
use crate::errors::AppResult;
use crate::repositories::support::{collect, index, map_mongo_error};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn blacklist_for_user(&self, user_id: &str) -> AppResult<Vec<BlacklistEntry>>;

    async fn moderation_actions_for_user(&self, user_id: &str) -> AppResult<Vec<ModerationAction>>;
}

pub struct MongoAccountRepository {
    blacklist: Collection<BlacklistEntry>,
    moderation_actions: Collection<ModerationAction>,
}

impl MongoAccountRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            blacklist: db.collection(collections::BLACKLIST),
            moderation_actions: db.collection(collections::MODERATION_ACTIONS),
        }
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        self.blacklist
            .create_index(index(doc! { "user": 1 }, "user", false))
            .await
            .map_err(map_mongo_error)?;
        self.moderation_actions
            .create_index(index(doc! { "user": 1 }, "user", false))
            .await
            .map_err(map_mongo_error)?;

        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MongoAccountRepository {
    async fn blacklist_for_user(&self, user_id: &str) -> AppResult<Vec<BlacklistEntry>> {
        let cursor = self.blacklist
            .find(doc! { "user": user_id })
            .await
            .map_err(map_mongo_error)?;

        collect(cursor).await
    }

    async fn moderation_actions_for_user(&self, user_id: &str) -> AppResult<Vec<ModerationAction>> {
        let cursor = self.moderation_actions
            .find(doc! { "user": user_id })
            .await
            .map_err(map_mongo_error)?;

        collect(cursor).await
    }
}
