//! # Redis 캐시 클라이언트 구현
//!
//! OAuth `state` 같은 수명이 짧은 값을 저장하는 Redis 래퍼입니다.
//! 값은 JSON 으로 직렬화되어 저장되며, 모든 작업은 비동기로 수행됩니다.
//!
//! ## 연결 관리
//!
//! `ConnectionManager`는 끊어진 연결을 자동으로 다시 맺고, 복제 비용이 낮아
//! 요청마다 복제해서 사용합니다.

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{Serialize, de::DeserializeOwned};
use crate::config::RedisConfig;

/// Redis 캐시 클라이언트 래퍼
///
/// ## 사용 예제
///
/// ```rust,ignore
/// use crate::caching::redis::RedisClient;
///
/// let redis = RedisClient::new(&config.redis).await?;
///
/// // OAuth state 10분 저장
/// redis.set_with_expiry("oauth_state:abc", &"discord", 600).await?;
///
/// // 한 번만 꺼내 쓰기
/// let provider: Option<String> = redis.get_del("oauth_state:abc").await?;
/// ```
#[derive(Clone)]
pub struct RedisClient {
    connection: ConnectionManager,
}

impl RedisClient {
    /// 새 Redis 클라이언트 인스턴스를 생성합니다.
    ///
    /// 생성 시 PING 명령으로 서버 가용성을 확인합니다.
    ///
    /// ## 에러 케이스
    ///
    /// - 잘못된 URL 형식
    /// - Redis 서버에 연결할 수 없는 경우
    /// - 인증 실패
    pub async fn new(config: &RedisConfig) -> Result<Self, redis::RedisError> {
        let client = Client::open(config.url.as_str())?;
        let mut connection = ConnectionManager::new(client).await?;

        redis::cmd("PING").query_async::<()>(&mut connection).await?;

        log::info!("✅ Redis 연결 성공");

        Ok(Self { connection })
    }

    /// 만료 시간과 함께 값을 저장합니다. 기존 키가 있으면 덮어씁니다.
    pub async fn set_with_expiry<T: Serialize>(&self, key: &str, value: &T, seconds: u64) -> Result<(), redis::RedisError> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| redis::RedisError::from((redis::ErrorKind::TypeError, "Serialization failed", e.to_string())))?;
        conn.set_ex(key, json, seconds).await
    }

    /// 값을 조회하면서 같은 명령으로 키를 삭제합니다 (`GETDEL`).
    ///
    /// 동시에 두 요청이 같은 키를 꺼내도 한쪽만 값을 받습니다.
    pub async fn get_del<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, redis::RedisError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get_del(key).await?;
        value.map(|json| decode(&json)).transpose()
    }
}

fn decode<T: DeserializeOwned>(json: &str) -> Result<T, redis::RedisError> {
    serde_json::from_str(json)
        .map_err(|e| redis::RedisError::from((redis::ErrorKind::TypeError, "Deserialization failed", e.to_string())))
}
