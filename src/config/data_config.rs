//! 실행 환경 및 데이터 저장소 설정
//!
//! 실행 환경(개발/테스트/스테이징/운영) 구분과 MongoDB, Redis 연결 정보를 관리합니다.

use super::{ConfigError, ConfigSource};

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// `ENVIRONMENT` 값에서 실행 환경을 결정합니다. 값이 없으면 운영 환경으로 간주합니다.
    pub fn from_source(source: &impl ConfigSource) -> Self {
        Self::from_str(&source.get_or("ENVIRONMENT", "production"))
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// MongoDB 연결 설정
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub database_name: String,
    /// 서버 선택 및 연결 타임아웃 (초)
    pub timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            uri: source.get_or("MONGODB_URI", "mongodb://localhost:27017"),
            database_name: source.get_or("DATABASE_NAME", "identity_link_dev"),
            timeout_secs: source.parse_or("DATABASE_TIMEOUT_SECS", 5)?,
        })
    }
}

/// Redis 연결 설정
///
/// Redis는 OAuth `state` 값 보관 용도로만 사용됩니다.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// OAuth state 유효 시간 (초)
    pub oauth_state_ttl_secs: u64,
}

impl RedisConfig {
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            url: source.get_or("REDIS_URL", "redis://localhost:6379"),
            oauth_state_ttl_secs: source.parse_or("OAUTH_STATE_TTL_SECS", 600)?,
        })
    }
}
