//! 외부 API 통합 모델
//!
//! 아이덴티티 프로바이더와 결제 프로바이더의 요청/응답 형태입니다.

pub mod billing;
pub mod discord;
pub mod lastfm;
pub mod roblox;

pub use billing::*;
pub use discord::*;
pub use lastfm::*;
pub use roblox::*;
