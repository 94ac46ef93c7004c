//! 워크스페이스 봇과 봇 사용량 기록 (bots, bot_analytics 컬렉션)

pub mod bot;

pub use bot::*;
