//! 리포지토리 공통 도우미
//!
//! MongoDB 에러 분류, 유니크 인덱스 생성, 인메모리 구현의 잠금 처리를 모아둡니다.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use futures_util::TryStreamExt;
use mongodb::{
    Cursor, IndexModel,
    bson::Document,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};
use serde::de::DeserializeOwned;
use crate::errors::AppError;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB 에러를 AppError로 변환합니다.
///
/// 유니크 인덱스 위반(11000)만 `DuplicateKey`로, 나머지는 `DatabaseError`로 분류됩니다.
pub fn map_mongo_error(error: mongodb::error::Error) -> AppError {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE => {
            AppError::DuplicateKey(write_error.message.clone())
        }
        _ => AppError::DatabaseError(error.to_string()),
    }
}

/// 이름이 붙은 인덱스 모델을 만듭니다.
pub fn index(keys: Document, name: &str, unique: bool) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder()
            .unique(unique)
            .name(name.to_string())
            .build())
        .build()
}

/// 커서 전체를 벡터로 모읍니다.
pub async fn collect<T>(cursor: Cursor<T>) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned + Send + Sync + Unpin,
{
    cursor.try_collect().await.map_err(map_mongo_error)
}

/// 날짜 값을 저장소 표현(bson)으로 변환합니다.
pub fn to_bson<T: serde::Serialize>(value: &T) -> Result<mongodb::bson::Bson, AppError> {
    mongodb::bson::to_bson(value).map_err(|e| AppError::InternalError(format!("bson 변환 실패: {}", e)))
}

pub fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, AppError> {
    lock.read().map_err(|_| AppError::InternalError("저장소 잠금이 손상되었습니다".to_string()))
}

pub fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, AppError> {
    lock.write().map_err(|_| AppError::InternalError("저장소 잠금이 손상되었습니다".to_string()))
}
