//! # Domain Models Module
//!
//! 저장되지 않는 도메인 모델과 값 객체를 정의합니다.
//!
//! ```text
//! models/
//! ├── auth/        ← 요청 단위 인증 정보 (AuthenticatedUser, AuthContext)
//! ├── identity/    ← 정규화된 프로바이더 인증 결과 (ProviderIdentity)
//! ├── providers/   ← Discord, LastFM, Roblox, 결제 API 요청/응답 형태
//! └── token/       ← 세션 토큰 클레임
//! ```
//!
//! ### Entities와의 차이
//!
//! - **Entities**: 저장소에 영속되며 `id`로 식별됨 (`LinkedProvider`, `Profile`)
//! - **Models**: 요청 처리 중에만 존재하는 값 (`ProviderIdentity`, `SessionClaims`)

pub mod auth;
pub mod identity;
pub mod providers;
pub mod token;

pub use auth::*;
pub use identity::*;
pub use token::*;
