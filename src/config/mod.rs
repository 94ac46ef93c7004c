//! # Configuration Module
//!
//! 서비스 전체 설정을 담당하는 모듈입니다.
//! 모든 설정은 프로세스 시작 시점에 **단 한 번** 환경 변수에서 읽혀
//! [`AppConfig`] 구조체로 고정되며, 이후 어떤 컴포넌트도 환경 변수를 직접 조회하지 않습니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 실행 환경, MongoDB, Redis 설정
//! - [`auth_config`] - 프로바이더 종류, JWT, 쿠키, Discord/LastFM/Roblox 설정
//! - [`app_config`] - 서버, HTTP 클라이언트, 결제, Rate Limiting 및 전체 묶음
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use identity_link_backend::config::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! let token_service = TokenService::new(config.jwt.clone());
//! ```
//!
//! ## 환경 변수 설정 가이드
//!
//! ```bash
//! # 서버
//! export HOST="0.0.0.0"
//! export PORT="8080"
//! export ENVIRONMENT="production"
//!
//! # 세션 토큰
//! export JWT_SECRET="your-super-secret-key"
//! export COOKIE_DOMAIN="astralapp.io"
//! export CALLBACK_URL="https://api.astralapp.io/api/v1/auth/callback/{provider}"
//!
//! # 프로바이더
//! export DISCORD_CLIENT_ID="..."
//! export DISCORD_CLIENT_SECRET="..."
//! export LASTFM_KEY="..."
//! export LASTFM_SECRET="..."
//! export ROBLOX_CHALLENGE_WORDS="5"
//!
//! # 결제
//! export STRIPE_SECRET_KEY="sk_live_..."
//! ```

pub mod app_config;
pub mod auth_config;
pub mod data_config;

pub use app_config::*;
pub use auth_config::*;
pub use data_config::*;

use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// 설정 로딩 에러
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// 필수 환경 변수 누락
    #[error("{0} must be set")]
    Missing(String),

    /// 값 파싱 실패
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: String, value: String },
}

/// 설정 값을 읽어오는 원천
///
/// 운영에서는 프로세스 환경 변수를, 테스트에서는 `HashMap`을 사용합니다.
/// 테스트가 전역 환경 변수를 건드리지 않도록 분리되어 있습니다.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.get(key).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
            }),
            None => Ok(default),
        }
    }
}

/// 프로세스 환경 변수
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}
