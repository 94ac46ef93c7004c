//! OAuth `state` 저장소
//!
//! Discord 로그인 시작 시 발급한 `state`를 TTL과 함께 보관하고,
//! 콜백에서 정확히 한 번만 소비합니다.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use crate::caching::redis::RedisClient;
use crate::config::AuthProvider;
use crate::errors::{AppError, AppResult};

const KEY_PREFIX: &str = "oauth_state:";

#[async_trait]
pub trait OAuthStateStore: Send + Sync {
    /// `state`를 `ttl` 동안 유효하게 저장합니다.
    async fn issue(&self, state: &str, provider: AuthProvider, ttl: Duration) -> AppResult<()>;

    /// `state`를 소비합니다. 발급한 프로바이더와 일치하고 아직 소비되지 않았을 때만 `true`.
    async fn consume(&self, state: &str, provider: AuthProvider) -> AppResult<bool>;
}

/// Redis 기반 구현
pub struct RedisOAuthStateStore {
    redis: RedisClient,
}

impl RedisOAuthStateStore {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl OAuthStateStore for RedisOAuthStateStore {
    async fn issue(&self, state: &str, provider: AuthProvider, ttl: Duration) -> AppResult<()> {
        self.redis
            .set_with_expiry(&format!("{}{}", KEY_PREFIX, state), &provider, ttl.as_secs().max(1))
            .await
            .map_err(|e| AppError::RedisError(e.to_string()))
    }

    async fn consume(&self, state: &str, provider: AuthProvider) -> AppResult<bool> {
        let stored: Option<AuthProvider> = self.redis
            .get_del(&format!("{}{}", KEY_PREFIX, state))
            .await
            .map_err(|e| AppError::RedisError(e.to_string()))?;

        Ok(stored == Some(provider))
    }
}

/// 프로세스 내 구현 (테스트, 단일 인스턴스 개발 환경)
#[derive(Default)]
pub struct InMemoryOAuthStateStore {
    entries: RwLock<HashMap<String, (AuthProvider, Instant)>>,
}

impl InMemoryOAuthStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OAuthStateStore for InMemoryOAuthStateStore {
    async fn issue(&self, state: &str, provider: AuthProvider, ttl: Duration) -> AppResult<()> {
        let mut entries = self.entries
            .write()
            .map_err(|_| AppError::InternalError("oauth state lock poisoned".to_string()))?;
        entries.insert(state.to_string(), (provider, Instant::now() + ttl));
        Ok(())
    }

    async fn consume(&self, state: &str, provider: AuthProvider) -> AppResult<bool> {
        let mut entries = self.entries
            .write()
            .map_err(|_| AppError::InternalError("oauth state lock poisoned".to_string()))?;

        Ok(match entries.remove(state) {
            Some((stored, deadline)) => stored == provider && Instant::now() < deadline,
            None => false,
        })
    }
}
