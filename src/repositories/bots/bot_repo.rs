//! # 봇 리포지토리
//!
//! `bots` 컬렉션은 워크스페이스당 봇 하나(`workspace` 유니크 인덱스)를 보장합니다.
//! `bot_analytics`는 봇 런타임이 기록하며 여기서는 읽기만 합니다.

use async_trait::async_trait;
use mongodb::{Collection, bson::doc};
use crate::db::{Database, collections};
use crate::domain::entities::bots::{Bot, BotAnalytics};
use crate::errors::{AppError, AppResult};
use crate::repositories::support::{collect, index, map_mongo_error};

#[async_trait]
pub trait BotRepository: Send + Sync {
    async fn find_by_workspace(&self, workspace: &str) -> AppResult<Option<Bot>>;

    /// 워크스페이스에 이미 봇이 있으면 `DuplicateKey`.
    async fn insert(&self, bot: &Bot) -> AppResult<Bot>;

    async fn update(&self, bot: &Bot) -> AppResult<Bot>;

    async fn delete(&self, workspace: &str, id: &str) -> AppResult<bool>;

    async fn for_owner(&self, owner: &str) -> AppResult<Vec<Bot>>;

    async fn delete_for_owner(&self, owner: &str) -> AppResult<u64>;

    /// 정렬되지 않은 사용량 기록
    async fn analytics_for(&self, bot: &str) -> AppResult<Vec<BotAnalytics>>;
}

pub struct MongoBotRepository {
    bots: Collection<Bot>,
    analytics: Collection<BotAnalytics>,
}

impl MongoBotRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            bots: db.collection(collections::BOTS),
            analytics: db.collection(collections::BOT_ANALYTICS),
        }
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        self.bots
            .create_indexes([
                index(doc! { "id": 1 }, "id_unique", true),
                index(doc! { "workspace": 1 }, "workspace_unique", true),
                index(doc! { "owner": 1 }, "owner", false),
            ])
            .await
            .map_err(map_mongo_error)?;

        self.analytics
            .create_index(index(doc! { "bot": 1, "timestamp": -1 }, "bot_timestamp", false))
            .await
            .map_err(map_mongo_error)?;

        Ok(())
    }
}

#[async_trait]
impl BotRepository for MongoBotRepository {
    async fn find_by_workspace(&self, workspace: &str) -> AppResult<Option<Bot>> {
        self.bots
            .find_one(doc! { "workspace": workspace })
            .await
            .map_err(map_mongo_error)
    }

    async fn insert(&self, bot: &Bot) -> AppResult<Bot> {
        self.bots
            .insert_one(bot)
            .await
            .map_err(map_mongo_error)?;

        Ok(bot.clone())
    }

    async fn update(&self, bot: &Bot) -> AppResult<Bot> {
        let result = self.bots
            .replace_one(doc! { "id": &bot.id }, bot)
            .await
            .map_err(map_mongo_error)?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound("Bot not found".to_string()));
        }

        Ok(bot.clone())
    }

    async fn delete(&self, workspace: &str, id: &str) -> AppResult<bool> {
        let result = self.bots
            .delete_one(doc! { "workspace": workspace, "id": id })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn for_owner(&self, owner: &str) -> AppResult<Vec<Bot>> {
        let cursor = self.bots
            .find(doc! { "owner": owner })
            .await
            .map_err(map_mongo_error)?;

        collect(cursor).await
    }

    async fn delete_for_owner(&self, owner: &str) -> AppResult<u64> {
        let result = self.bots
            .delete_many(doc! { "owner": owner })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count)
    }

    async fn analytics_for(&self, bot: &str) -> AppResult<Vec<BotAnalytics>> {
        let cursor = self.analytics
            .find(doc! { "bot": bot })
            .await
            .map_err(map_mongo_error)?;

        collect(cursor).await
    }
}
