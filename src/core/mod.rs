//! # Core Module
//!
//! 애플리케이션 조립을 담당합니다.
//!
//! ## 모듈 구성
//!
//! ### [`registry`] - 서비스 조립
//! - **ServiceDeps**: 저장소, OAuth state 저장소, 외부 API 클라이언트 묶음
//! - **AppServices**: 핸들러가 `web::Data`로 공유하는 서비스 묶음
//!
//! ## 사용 패턴
//!
//! ```rust,ignore
//! use actix_web::web;
//! use identity_link_backend::core::registry::{AppServices, ServiceDeps};
//!
//! let config = AppConfig::from_env()?;
//! let deps = ServiceDeps::connect(&config).await?;
//! let services = web::Data::new(AppServices::assemble(&config, deps));
//!
//! HttpServer::new(move || App::new().app_data(services.clone()))
//! ```
//!
//! 에러 타입은 [`crate::errors`]에 있습니다.

pub mod registry;

pub use registry::*;
