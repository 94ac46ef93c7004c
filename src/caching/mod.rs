//! 캐싱 계층 모듈
//!
//! Redis를 백엔드로 하는 단기 저장소를 제공합니다.
//! 사용자 데이터는 캐시하지 않으며, OAuth `state`처럼 TTL이 있는 값만 보관합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use crate::caching::{redis::RedisClient, oauth_state::RedisOAuthStateStore};
//!
//! let redis = RedisClient::new(&config.redis).await?;
//! let states = RedisOAuthStateStore::new(redis);
//! states.issue("abc", AuthProvider::Discord, Duration::from_secs(600)).await?;
//! ```
//!
//! # 환경 설정
//!
//! ```bash
//! REDIS_URL=redis://localhost:6379  # 기본값
//! OAUTH_STATE_TTL_SECS=600
//! ```

pub mod oauth_state;
pub mod redis;
