//! # 프로필 리포지토리
//!
//! `profiles` 컬렉션에 대한 계약과 MongoDB 구현입니다.
//! 프로필 `id`는 내부 사용자 ID와 같고, `discord_id`는 앵커 아이덴티티의 고유 ID입니다.

use async_trait::async_trait;
use mongodb::{Collection, bson::doc};
use crate::db::{Database, collections};
use crate::domain::entities::profiles::Profile;
use crate::errors::{AppError, AppResult};
use crate::repositories::support::{index, map_mongo_error};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Profile>>;

    async fn find_by_discord_id(&self, discord_id: &str) -> AppResult<Option<Profile>>;

    /// 유니크 제약 위반 시 `DuplicateKey`.
    async fn insert(&self, profile: &Profile) -> AppResult<Profile>;

    /// 없으면 `NotFound`.
    async fn update(&self, profile: &Profile) -> AppResult<Profile>;

    async fn delete(&self, id: &str) -> AppResult<bool>;
}

pub struct MongoProfileRepository {
    collection: Collection<Profile>,
}

impl MongoProfileRepository {
    pub fn new(db: &Database) -> Self {
        Self { collection: db.collection(collections::PROFILES) }
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        self.collection
            .create_indexes([
                index(doc! { "id": 1 }, "id_unique", true),
                index(doc! { "discord_id": 1 }, "discord_id_unique", true),
            ])
            .await
            .map_err(map_mongo_error)?;

        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for MongoProfileRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Profile>> {
        self.collection
            .find_one(doc! { "id": id })
            .await
            .map_err(map_mongo_error)
    }

    async fn find_by_discord_id(&self, discord_id: &str) -> AppResult<Option<Profile>> {
        self.collection
            .find_one(doc! { "discord_id": discord_id })
            .await
            .map_err(map_mongo_error)
    }

    async fn insert(&self, profile: &Profile) -> AppResult<Profile> {
        self.collection
            .insert_one(profile)
            .await
            .map_err(map_mongo_error)?;

        Ok(profile.clone())
    }

    async fn update(&self, profile: &Profile) -> AppResult<Profile> {
        let result = self.collection
            .replace_one(doc! { "id": &profile.id }, profile)
            .await
            .map_err(map_mongo_error)?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound("Profile not found".to_string()));
        }

        Ok(profile.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection
            .delete_one(doc! { "id": id })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count > 0)
    }
}
