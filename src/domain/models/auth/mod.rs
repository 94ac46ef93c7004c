//! 요청 단위 인증 모델
//!
//! 미들웨어가 요청 확장(extensions)에 하나씩 채워 넣는 값들과,
//! 핸들러가 이를 강타입으로 받는 추출자를 정의합니다.

pub mod auth_context;
pub mod authenticated_user;

pub use auth_context::*;
pub use authenticated_user::*;
