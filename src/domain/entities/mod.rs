//! # Domain Entities Module
//!
//! 저장소 컬렉션과 1:1로 대응되는 영속 엔티티들을 정의합니다.
//!
//! ```text
//! entities/
//! ├── providers/    ← LinkedProvider, 프로바이더별 부가 상태 (providers 컬렉션)
//! ├── profiles/     ← Profile (profiles 컬렉션)
//! ├── accounts/     ← 블랙리스트, 모더레이션 기록
//! ├── bots/         ← Bot, BotAnalytics
//! └── workspaces/   ← Workspace, WorkspaceMember, WorkspaceIntegration
//! ```
//!
//! 모든 엔티티는 `id` 문자열 필드(UUID v4)를 식별자로 사용하며,
//! MongoDB가 붙이는 `_id`는 역직렬화 시 무시됩니다.

pub mod accounts;
pub mod bots;
pub mod profiles;
pub mod providers;
pub mod workspaces;

pub use accounts::*;
pub use bots::*;
pub use profiles::*;
pub use providers::*;
pub use workspaces::*;
