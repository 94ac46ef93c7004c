//! # HTTP Request Handlers Module
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 정의하는 모듈입니다.
//! 핸들러는 요청을 DTO와 [`ProviderRequest`](crate::services::auth::providers::ProviderRequest)로 바꿔
//! 서비스에 넘기고, 결과를 응답 봉투나 리다이렉트로 바꾸는 일만 합니다.
//!
//! ## 아키텍처 위치
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//!   Client (Browser, Dashboard, Bot)
//! └─────────────────────┬───────────────────────┘
//!                       │ HTTP Request/Response
//! ┌─────────────────────▼───────────────────────┐
//!   Middlewares - 세션 토큰, 프로필, 워크스페이스      ← Request Context
//! ├─────────────────────────────────────────────┤
//!   Handlers (이 모듈) - HTTP 엔드포인트 처리         ← Web Layer
//! ├─────────────────────────────────────────────┤
//!   Services - 로그인 흐름, 조정, 계정, 워크스페이스    ← Service Layer
//! ├─────────────────────────────────────────────┤
//!   Repositories / Clients - 저장소, 외부 API        ← Adapter Layer
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## 응답 규칙
//!
//! - JSON 응답은 모두 `{ "result", "error", "code" }` 봉투를 씁니다.
//! - 돌아갈 주소(`redirect`)가 주어진 요청은 성공 시 302, 실패 시 `?error=<메시지>`를 붙여 302로 응답합니다.
//! - 입력 검증은 `validator` 크레이트로 핸들러에서 수행합니다.
//!
//! ```rust,ignore
//! #[post("")]
//! pub async fn create_workspace(
//!     services: web::Data<AppServices>,
//!     ctx: AuthContext,
//!     payload: web::Json<CreateWorkspaceRequest>,
//! ) -> Result<HttpResponse, AppError> {
//!     payload.validate()
//!         .map_err(|e| AppError::ValidationError(e.to_string()))?;
//!
//!     let workspace = services.workspaces.create(ctx.profile()?, payload.into_inner()).await?;
//!     Ok(HttpResponse::Created().json(ApiResponse::created(workspace)))
//! }
//! ```
//!
//! ## 모듈 구성
//!
//! - **`auth`**: 로그인/콜백/로그아웃, 세션, 계정 엔드포인트
//! - **`workspaces`**: 워크스페이스와 멤버 관리
//! - **`responder`**: 쿠키, 리다이렉트, 에러 응답 선택

#[cfg(test)]
pub(crate) mod testing;

pub mod auth;
pub mod responder;
pub mod workspaces;
