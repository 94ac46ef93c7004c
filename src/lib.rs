//! 아이덴티티 연결 서비스 백엔드
//!
//! 하나의 사용자 계정에 여러 외부 아이덴티티(Discord, LastFM, Roblox)를 연결하고,
//! 연결된 사용자들이 워크스페이스를 만들고 멤버를 관리하도록 하는 서비스입니다.
//!
//! # Features
//!
//! - **프로바이더 연결**: Discord OAuth2, LastFM 웹 인증, Roblox 문구 검증
//! - **세션 토큰**: 앵커 프로바이더(Discord) 아이덴티티를 담은 HS256 JWT 쿠키
//! - **계정**: 프로필, 차단 상태, GDPR 내보내기, 계정 삭제
//! - **워크스페이스**: 플랜/공개 범위, 멤버 역할 관리
//! - **명시적 DI**: 시작 시 한 번 조립한 `AppServices`를 `web::Data`로 공유
//! - **MongoDB**: 연결/프로필/워크스페이스 영구 저장
//! - **Redis**: OAuth state 저장
//!
//! # 로그인 흐름
//!
//! ```text
//!  /auth/login/{provider}          /auth/callback/{provider}
//!          │                                  │
//!   ProviderRegistry ─ discord | lastfm | roblox ─┐
//!          │                                  │
//!   동의 화면 302 / 검증 문구          ProviderIdentity / 검증된 레코드
//!                                             │
//!                                   IdentityService (생성 또는 갱신)
//!                                             │
//!                                   TokenService → `token` 쿠키
//! ```
//!
//! 요청은 routes → handlers → services → repositories/clients 순서로 내려가며,
//! 저장소는 MongoDB, OAuth state는 Redis에 둡니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use identity_link_backend::config::AppConfig;
//! use identity_link_backend::core::registry::{AppServices, ServiceDeps};
//!
//! let config = AppConfig::from_env()?;
//! let deps = ServiceDeps::connect(&config).await?;
//! let services = web::Data::new(AppServices::assemble(&config, deps));
//! ```

pub mod core;
pub mod config;
pub mod db;
pub mod caching;
pub mod clients;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod routes;
pub mod handlers;
pub mod errors;
pub mod middlewares;
