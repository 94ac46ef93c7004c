//! URL 구조와 스코프별 미들웨어
//!
//! 모든 API 엔드포인트는 `/api/v1` 아래에 있으며, 헬스체크만 루트에 둡니다.
//!
//! # Auth Levels
//!
//! ## `/auth` (선택적 인증)
//! 로그인/콜백은 비로그인 요청도 받지만, 세션이 있으면 앵커 아이덴티티로 사용합니다.
//! 계정 엔드포인트는 핸들러의 `AuthenticatedUser` 추출자가 로그인을 요구합니다.
//! ```rust,ignore
//! web::scope("/auth")
//!     .wrap(AuthMiddleware::optional())
//!     .service(handlers::auth::login)
//! ```
//!
//! ## `/workspaces` (필수 인증 + 프로필 + 멤버십)
//! ```rust,ignore
//! web::scope("/workspaces")
//!     .wrap(from_fn(load_profile))
//!     .wrap(AuthMiddleware::required())
//!     .service(
//!         web::scope("/{workspace_id}")
//!             .wrap(from_fn(load_workspace))
//!     )
//! ```
//!
//! `wrap`은 나중에 등록한 것이 바깥쪽에서 먼저 실행됩니다.

use actix_web::middleware::from_fn;
use actix_web::{get, web, HttpResponse};
use serde_json::json;
use crate::domain::dto::ApiResponse;
use crate::handlers;
use crate::middlewares::{load_bot, load_profile, load_workspace, AuthMiddleware};

/// `/health`와 `/api/v1` 아래 전체 라우트
///
/// ```rust,ignore
/// let app = App::new()
///     .app_data(web::Data::new(services))
///     .configure(configure_all_routes);
/// ```
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);

    cfg.service(
        web::scope("/api/v1")
            .service(index)
            .configure(configure_auth_routes)
            .configure(configure_workspace_routes),
    );
}

/// 인증 관련 라우트를 설정합니다
///
/// # Available Routes
///
/// - `GET|POST /api/v1/auth/login/{provider}` - 로그인 시작
/// - `GET|POST /api/v1/auth/callback/{provider}` - 로그인 완료
/// - `GET /api/v1/auth/logout/{provider}` - 로그아웃 / 연결 해제
/// - `GET /api/v1/auth/session` - 세션 정보
/// - `GET /api/v1/auth/providers`, `GET|POST /api/v1/auth/providers/{provider}` - 연결 조회/새로고침
/// - `GET /api/v1/auth/status`, `GET /api/v1/auth/gdpr`, `POST /api/v1/auth/delete` - 계정
///
/// # Examples
///
/// ```bash
/// # Discord 로그인 후 대시보드로 돌아가기
/// curl -i "http://localhost:8080/api/v1/auth/login/discord?redirect=https://astralapp.io/dashboard"
///
/// # Roblox 검증 문구 발급 (Discord 세션 필요)
/// curl -b "token=eyJ..." "http://localhost:8080/api/v1/auth/login/roblox?username=builderman"
/// ```
fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .wrap(AuthMiddleware::optional())
            // 프로바이더 흐름
            .service(handlers::auth::login)
            .service(handlers::auth::callback)
            .service(handlers::auth::logout)
            // 계정
            .service(handlers::auth::session)
            .service(handlers::auth::list_providers)
            .service(handlers::auth::get_provider)
            .service(handlers::auth::refresh_provider)
            .service(handlers::auth::status)
            .service(handlers::auth::gdpr)
            .service(handlers::auth::delete_account),
    );
}

/// 워크스페이스 라우트를 설정합니다
///
/// `/{workspace_id}` 아래는 요청자가 해당 워크스페이스의 멤버여야 합니다.
/// `/bot`과 `/integrations/{integration_id}`는 워크스페이스에 봇이 있어야 합니다.
///
/// 스코프는 접두사로 매칭되므로 `/bot/create`와 `/integrations/enable|disable/...`를
/// 각 스코프보다 먼저 등록합니다.
fn configure_workspace_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/workspaces")
            .wrap(from_fn(load_profile))
            .wrap(AuthMiddleware::required())
            .service(handlers::workspaces::list_workspaces)
            .service(handlers::workspaces::create_workspace)
            .service(
                web::scope("/{workspace_id}")
                    .wrap(from_fn(load_workspace))
                    .service(handlers::workspaces::get_workspace)
                    .service(handlers::workspaces::update_workspace)
                    .service(handlers::workspaces::list_members)
                    .service(handlers::workspaces::add_member)
                    .service(handlers::workspaces::get_member)
                    .service(handlers::workspaces::update_member)
                    .service(handlers::workspaces::delete_member)
                    .service(handlers::workspaces::remove_member)
                    // 봇
                    .service(handlers::workspaces::create_bot)
                    .service(
                        web::scope("/bot")
                            .wrap(from_fn(load_bot))
                            .service(handlers::workspaces::get_bot)
                            .service(handlers::workspaces::update_bot)
                            .service(handlers::workspaces::delete_bot),
                    )
                    .service(handlers::workspaces::analytics)
                    // 통합 기능
                    .service(handlers::workspaces::list_integrations)
                    .service(handlers::workspaces::enable_integration)
                    .service(handlers::workspaces::disable_integration)
                    .service(
                        web::scope("/integrations/{integration_id}")
                            .wrap(from_fn(load_bot))
                            .service(handlers::workspaces::get_integration)
                            .service(handlers::workspaces::update_integration),
                    ),
            ),
    );
}

/// # Endpoint
/// `GET /api/v1`
#[get("")]
async fn index() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(json!({
        "message": "Identity link API v1",
    })))
}

/// 헬스체크. 저장소에는 접근하지 않으며, 지원하는 프로바이더 목록을 함께 돌려줍니다.
///
/// `GET /health`
/// ```json
/// {
///   "status": "healthy",
///   "service": "identity_link_backend",
///   "version": "0.1.0",
///   "timestamp": "2024-01-01T00:00:00Z",
///   "providers": ["discord", "lastfm", "roblox"]
/// }
/// ```
#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "providers": ["discord", "lastfm", "roblox"],
    }))
}
