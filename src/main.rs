//! 아이덴티티 연결 서비스 메인 애플리케이션
//!
//! 설정을 한 번 읽고, 서비스 그래프를 조립한 뒤 Actix-web HTTP 서버를 구동합니다.
//! MongoDB와 Redis 연결은 시작 시점에 확인되며, 실패하면 프로세스가 에러로 종료됩니다.

use std::io;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use actix_governor::{Governor, GovernorConfigBuilder};
use env_logger::Env;
use log::{error, info};
use identity_link_backend::config::AppConfig;
use identity_link_backend::core::registry::{AppServices, ServiceDeps};
use identity_link_backend::routes::configure_all_routes;

#[actix_web::main]
async fn main() -> io::Result<()> {
    load_env_file();
    init_logging();

    info!("🚀 아이덴티티 연결 서비스 시작중...");

    let config = AppConfig::from_env().map_err(|e| {
        error!("설정 로드 실패: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;
    info!("실행 환경: {:?}", config.environment);

    let deps = ServiceDeps::connect(&config).await.map_err(|e| {
        error!("서비스 의존성 초기화 실패: {}", e);
        io::Error::other(e.to_string())
    })?;
    let services = web::Data::new(AppServices::assemble(&config, deps));

    info!("✅ 저장소, 프로바이더 어댑터, 서비스 조립 완료");

    start_http_server(&config, services).await
}

/// Rate Limiting, CORS, 접근 로그, 경로 정규화를 건 서버를 띄웁니다.
///
/// 포트 바인딩에 실패하면 `io::Error`를 돌려줍니다.
async fn start_http_server(config: &AppConfig, services: web::Data<AppServices>) -> io::Result<()> {
    let bind_address = config.server.bind_address();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);
    info!("📍 API: http://{}/api/v1", bind_address);

    let rate_limit = &config.rate_limit;
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit.per_second)
        .burst_size(rate_limit.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Rate Limiting 설정이 올바르지 않습니다"))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit.per_second,
        rate_limit.burst_size
    );

    HttpServer::new(move || {
        App::new()
            .app_data(services.clone())
            // 마지막에 감싼 것이 먼저 실행되므로 경로 정규화 → 로그 → CORS → Rate Limiting
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_all_routes)
    })
        .bind(bind_address)?
        .workers(config.server.workers)
        .run()
        .await
}

/// `PROFILE`에 맞는 dotenv 파일을 읽습니다.
///
/// `dev`(기본값)는 `.env.dev`, `prod`는 `.env.prod`, 그 밖의 값은 `.env`입니다.
/// 파일이 없어도 이미 설정된 환경 변수로 계속 진행합니다.
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());
    let filename = match profile.as_str() {
        "dev" | "prod" => format!(".env.{}", profile),
        _ => ".env".to_string(),
    };

    // 로거 초기화 전이므로 결과는 stderr로만 알립니다
    if let Err(e) = dotenv::from_filename(&filename) {
        eprintln!("{} 파일을 읽지 못했습니다 ({}), 환경 변수만 사용합니다", filename, e);
    }
}

/// `RUST_LOG`가 없으면 `info,actix_web=debug`
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

/// CORS 설정
///
/// 대시보드 도메인(`astralapp.io`와 하위 도메인)과 로컬 개발 서버를 허용합니다.
/// 세션 쿠키를 주고받으므로 자격 증명을 지원합니다.
fn configure_cors() -> Cors {
    Cors::default()
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://localhost:8000")
        .allowed_origin("https://astralapp.io")
        .allowed_origin_fn(|origin, _| {
            origin
                .to_str()
                .map(|o| o.starts_with("https://") && o.ends_with(".astralapp.io"))
                .unwrap_or(false)
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}
