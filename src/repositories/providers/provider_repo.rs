//! # 연결된 프로바이더 리포지토리
//!
//! `providers` 컬렉션에 대한 읽기/쓰기 계약과 MongoDB 구현입니다.
//!
//! ## 인덱스
//!
//! | 이름 | 키 | 유니크 |
//! |------|----|--------|
//! | `id_unique` | `id` | ✅ |
//! | `user_type_unique` | `user`, `type` | ✅ |
//! | `type_provider_id_unique` | `type`, `provider_id` | ✅ |
//! | `challenge_code` | `provider_data.code` | |
//!
//! 두 유니크 인덱스가 "존재 확인 후 삽입"의 경쟁 조건을 저장소 경계에서 막아줍니다.
//! 동시에 들어온 두 콜백 중 늦은 쪽은 `AppError::DuplicateKey`를 받습니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{Collection, bson::doc, options::ReturnDocument};
use crate::config::AuthProvider;
use crate::db::{Database, collections};
use crate::domain::entities::providers::LinkedProvider;
use crate::errors::{AppError, AppResult};
use crate::repositories::support::{collect, index, map_mongo_error, to_bson};

/// 연결된 프로바이더 저장소 계약
#[async_trait]
pub trait ProviderRepository: Send + Sync {
    /// 프로바이더 고유 ID로 조회합니다.
    async fn find_by_native_id(&self, provider: AuthProvider, native_id: &str) -> AppResult<Option<LinkedProvider>>;

    /// 사용자와 프로바이더 종류로 조회합니다.
    async fn find_by_user_and_type(&self, user_id: &str, provider: AuthProvider) -> AppResult<Option<LinkedProvider>>;

    /// Roblox 검증 문구로 조회합니다.
    async fn find_by_challenge_code(&self, code: &str) -> AppResult<Option<LinkedProvider>>;

    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<LinkedProvider>>;

    /// 새 레코드를 저장합니다. 유니크 제약 위반 시 `DuplicateKey`.
    async fn insert(&self, provider: &LinkedProvider) -> AppResult<LinkedProvider>;

    /// `id`가 같은 레코드 전체를 교체합니다. 없으면 `NotFound`.
    async fn update(&self, provider: &LinkedProvider) -> AppResult<LinkedProvider>;

    /// 대기 중인 검증 문구를 `verified`로 바꿉니다.
    ///
    /// 상태가 여전히 `pending`이고 문구가 같을 때만 바뀌며(compare-and-swap),
    /// 조건이 맞지 않으면 `None`을 반환합니다.
    async fn mark_challenge_verified(&self, id: &str, code: &str, now: DateTime<Utc>) -> AppResult<Option<LinkedProvider>>;

    async fn delete(&self, id: &str) -> AppResult<bool>;

    async fn delete_by_user_and_type(&self, user_id: &str, provider: AuthProvider) -> AppResult<bool>;

    /// 사용자의 모든 연결을 삭제하고 삭제된 개수를 반환합니다.
    async fn delete_by_user(&self, user_id: &str) -> AppResult<u64>;
}

/// MongoDB 구현
pub struct MongoProviderRepository {
    collection: Collection<LinkedProvider>,
}

impl MongoProviderRepository {
    pub fn new(db: &Database) -> Self {
        Self { collection: db.collection(collections::PROVIDERS) }
    }

    /// 유니크 제약과 조회용 인덱스를 생성합니다. 서버 시작 시 한 번 호출됩니다.
    pub async fn create_indexes(&self) -> AppResult<()> {
        self.collection
            .create_indexes([
                index(doc! { "id": 1 }, "id_unique", true),
                index(doc! { "user": 1, "type": 1 }, "user_type_unique", true),
                index(doc! { "type": 1, "provider_id": 1 }, "type_provider_id_unique", true),
                index(doc! { "provider_data.code": 1 }, "challenge_code", false),
            ])
            .await
            .map_err(map_mongo_error)?;

        Ok(())
    }
}

#[async_trait]
impl ProviderRepository for MongoProviderRepository {
    async fn find_by_native_id(&self, provider: AuthProvider, native_id: &str) -> AppResult<Option<LinkedProvider>> {
        self.collection
            .find_one(doc! { "type": provider.as_str(), "provider_id": native_id })
            .await
            .map_err(map_mongo_error)
    }

    async fn find_by_user_and_type(&self, user_id: &str, provider: AuthProvider) -> AppResult<Option<LinkedProvider>> {
        self.collection
            .find_one(doc! { "user": user_id, "type": provider.as_str() })
            .await
            .map_err(map_mongo_error)
    }

    async fn find_by_challenge_code(&self, code: &str) -> AppResult<Option<LinkedProvider>> {
        self.collection
            .find_one(doc! { "type": AuthProvider::Roblox.as_str(), "provider_data.code": code })
            .await
            .map_err(map_mongo_error)
    }

    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<LinkedProvider>> {
        let cursor = self.collection
            .find(doc! { "user": user_id })
            .await
            .map_err(map_mongo_error)?;

        collect(cursor).await
    }

    async fn insert(&self, provider: &LinkedProvider) -> AppResult<LinkedProvider> {
        let mut provider = provider.clone();
        if provider.id.is_none() {
            provider.id = Some(uuid::Uuid::new_v4().to_string());
        }

        self.collection
            .insert_one(&provider)
            .await
            .map_err(map_mongo_error)?;

        Ok(provider)
    }

    async fn update(&self, provider: &LinkedProvider) -> AppResult<LinkedProvider> {
        let id = provider.id.as_deref()
            .ok_or_else(|| AppError::InternalError("저장되지 않은 프로바이더는 갱신할 수 없습니다".to_string()))?;

        let result = self.collection
            .replace_one(doc! { "id": id }, provider)
            .await
            .map_err(map_mongo_error)?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound("Provider not found".to_string()));
        }

        Ok(provider.clone())
    }

    async fn mark_challenge_verified(&self, id: &str, code: &str, now: DateTime<Utc>) -> AppResult<Option<LinkedProvider>> {
        self.collection
            .find_one_and_update(
                doc! {
                    "id": id,
                    "type": AuthProvider::Roblox.as_str(),
                    "provider_data.status": "pending",
                    "provider_data.code": code,
                },
                doc! { "$set": { "provider_data.status": "verified", "updated_at": to_bson(&now)? } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection
            .delete_one(doc! { "id": id })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn delete_by_user_and_type(&self, user_id: &str, provider: AuthProvider) -> AppResult<bool> {
        let result = self.collection
            .delete_one(doc! { "user": user_id, "type": provider.as_str() })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn delete_by_user(&self, user_id: &str) -> AppResult<u64> {
        let result = self.collection
            .delete_many(doc! { "user": user_id })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count)
    }
}
