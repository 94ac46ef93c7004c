//! 데이터 액세스 계층을 담당하는 리포지토리 모듈
//!
//! 각 컬렉션 묶음마다 `async_trait` 계약(trait)과 MongoDB 구현을 두고,
//! 서비스는 `Arc<dyn ...Repository>`로만 의존합니다.
//! 테스트는 같은 계약의 인메모리 구현([`memory`])을 주입합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::{MongoProviderRepository, ProviderRepository};
//!
//! let providers = MongoProviderRepository::new(&database);
//! providers.create_indexes().await?;
//! let linked = providers.find_by_user_and_type(&user_id, AuthProvider::Roblox).await?;
//! ```

pub mod accounts;
pub mod bots;
pub mod memory;
pub mod profiles;
pub mod providers;
pub mod support;
pub mod workspaces;

pub use accounts::*;
pub use bots::*;
pub use profiles::*;
pub use providers::*;
pub use workspaces::*;
