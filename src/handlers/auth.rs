//! Authentication HTTP Handlers
//!
//! 프로바이더 로그인/콜백/로그아웃과 로그인 사용자의 계정 엔드포인트입니다.
//! `/auth` 스코프 전체에 선택적 인증 미들웨어가 걸려 있으며,
//! 계정 엔드포인트는 [`AuthenticatedUser`] 추출자로 로그인을 요구합니다.
//!
//! # Endpoints
//!
//! - `GET|POST /auth/login/{provider}`: 로그인 시작 (동의 화면 302 또는 Roblox 검증 문구)
//! - `GET|POST /auth/callback/{provider}`: 로그인 완료, `token` 쿠키 설정
//! - `GET /auth/logout/{provider}`: 세션 종료 또는 연결 해제
//! - `GET /auth/session`: 세션 토큰의 `UserInfo`
//! - `GET /auth/providers`, `GET|POST /auth/providers/{provider}`: 연결 목록/조회/새로고침
//! - `GET /auth/status`, `GET /auth/gdpr`, `POST /auth/delete`
//!
//! 브라우저 흐름은 `redirect`가 있으면 302, API 흐름은 JSON 봉투로 응답합니다.

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, post, route, web, HttpRequest, HttpResponse};
use serde_json::json;
use crate::core::registry::AppServices;
use crate::domain::dto::{ApiResponse, LinkResponse, ProviderParams, RedirectParams};
use crate::domain::models::auth::{AuthenticatedUser, OptionalUser};
use crate::errors::AppError;
use crate::handlers::responder::{
    found, redirect_param, stored_redirect, Completion, ErrorReporter, SessionCookies,
};
use crate::services::auth::providers::{LoginStart, LogoutOutcome, ProviderRequest};
use crate::utils::string_utils::append_query;

fn merged(query: web::Query<ProviderParams>, form: Option<web::Form<ProviderParams>>) -> ProviderParams {
    let form = form.map(|f| f.into_inner()).unwrap_or_default();
    query.into_inner().merge(form)
}

/// 로그인 시작 핸들러
///
/// `?redirect`가 있으면 `redirect` 쿠키에 저장해 두고 콜백에서 꺼내 씁니다.
/// Roblox는 검증 문구를 발급하며, 돌아갈 주소가 있으면 `?code=`로 붙여 보냅니다.
///
/// # Endpoint
/// `GET|POST /auth/login/{provider}`
#[route("/login/{provider}", method = "GET", method = "POST")]
pub async fn login(
    services: web::Data<AppServices>,
    provider: web::Path<String>,
    query: web::Query<ProviderParams>,
    form: Option<web::Form<ProviderParams>>,
    user: OptionalUser,
) -> HttpResponse {
    let params = merged(query, form);
    let redirect = params.redirect.clone();
    let cookies = SessionCookies::new(&services);
    let reporter = ErrorReporter::new(cookies.clone(), redirect.clone());

    let request = ProviderRequest::new(params, user.0);
    let start = match services.auth.begin_login(&provider, &request).await {
        Ok(start) => start,
        Err(e) => return reporter.report(e),
    };

    match start {
        LoginStart::Redirect(url) => {
            let mut builder = found(&url);
            if let Some(redirect) = &redirect {
                builder.cookie(cookies.redirect(redirect));
            }
            builder.finish()
        }
        LoginStart::Challenge(issued) => {
            let location = redirect.as_deref().map(|r| append_query(r, "code", &issued.code));
            let mut done = Completion::new(location.as_deref());
            if let Some(redirect) = &redirect {
                done = done.cookie(cookies.redirect(redirect));
            }
            done.body(issued)
        }
    }
}

/// 콜백 핸들러
///
/// 세션 토큰이 발급되면 `token` 쿠키로 설정합니다.
/// 로그인 시작 때 저장한 `redirect` 쿠키가 있으면 그 주소로 302 응답하고 쿠키를 지웁니다.
///
/// # Endpoint
/// `GET|POST /auth/callback/{provider}`
#[route("/callback/{provider}", method = "GET", method = "POST")]
pub async fn callback(
    req: HttpRequest,
    services: web::Data<AppServices>,
    provider: web::Path<String>,
    query: web::Query<ProviderParams>,
    form: Option<web::Form<ProviderParams>>,
    user: OptionalUser,
) -> HttpResponse {
    let params = merged(query, form);
    let redirect = stored_redirect(&req).or_else(|| params.redirect.clone());
    let cookies = SessionCookies::new(&services);
    let reporter = ErrorReporter::new(cookies.clone(), redirect.clone());

    let request = ProviderRequest::new(params, user.0);
    let result = match services.auth.complete_login(&provider, &request).await {
        Ok(result) => result,
        Err(e) => return reporter.report(e),
    };

    log::info!("{} 콜백 완료: 사용자 {} ({:?})", provider, result.provider.user_id, result.action);

    let mut done = Completion::new(redirect.as_deref());
    if redirect.is_some() {
        done = done.cookie(cookies.clear_redirect());
    }
    if let Some(token) = &result.session_token {
        done = done.cookie(cookies.token(token));
    }

    done.body(LinkResponse {
        action: result.action,
        provider: result.provider,
    })
}

/// 로그아웃 핸들러
///
/// Discord는 세션을 끝내고 `token` 쿠키를 지웁니다. 그 밖의 프로바이더는 연결 레코드를 삭제합니다.
///
/// # Endpoint
/// `GET /auth/logout/{provider}?redirect=<url>`
#[get("/logout/{provider}")]
pub async fn logout(
    services: web::Data<AppServices>,
    provider: web::Path<String>,
    query: web::Query<ProviderParams>,
    user: OptionalUser,
) -> HttpResponse {
    let params = query.into_inner();
    let redirect = params.redirect.clone();
    let cookies = SessionCookies::new(&services);
    let reporter = ErrorReporter::new(cookies.clone(), redirect.clone());

    let request = ProviderRequest::new(params, user.0);
    let outcome = match services.auth.logout(&provider, &request).await {
        Ok(outcome) => outcome,
        Err(e) => return reporter.report(e),
    };

    let done = Completion::new(redirect.as_deref());
    match outcome {
        LogoutOutcome::SessionEnded => done.cookie(cookies.clear_token()).body(json!({ "removed": true })),
        LogoutOutcome::Unlinked { removed } => done.body(json!({ "removed": removed })),
    }
}

/// 세션 토큰의 `UserInfo` 클레임
///
/// # Endpoint
/// `GET /auth/session`
#[get("/session")]
pub async fn session(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(user.provider))
}

/// # Endpoint
/// `GET /auth/providers`
#[get("/providers")]
pub async fn list_providers(
    services: web::Data<AppServices>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let providers = services.accounts.linked_providers(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(providers)))
}

/// 연결되지 않았으면 `result: null`
///
/// # Endpoint
/// `GET /auth/providers/{provider}`
#[get("/providers/{provider}")]
pub async fn get_provider(
    services: web::Data<AppServices>,
    provider: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let linked = services.accounts.linked_provider(&user.user_id, &provider).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(linked)))
}

/// 저장된 액세스 토큰으로 Discord 프로필을 다시 가져옵니다.
///
/// # Endpoint
/// `POST /auth/providers/{provider}`
#[post("/providers/{provider}")]
pub async fn refresh_provider(
    services: web::Data<AppServices>,
    provider: web::Path<String>,
    query: web::Query<RedirectParams>,
    form: Option<web::Form<RedirectParams>>,
    user: AuthenticatedUser,
) -> HttpResponse {
    let redirect = redirect_param(query, form);
    let reporter = ErrorReporter::new(SessionCookies::new(&services), redirect.clone());

    match services.accounts.refresh_provider(&user, &provider).await {
        Ok(linked) => Completion::new(redirect.as_deref()).body(linked),
        Err(e) => reporter.report(e),
    }
}

/// 로그인 상태와 블랙리스트 확인
///
/// HTTP 상태는 항상 200이며, 차단된 사용자는 봉투의 `code`가 403입니다.
///
/// # Endpoint
/// `GET /auth/status`
#[get("/status")]
pub async fn status(
    services: web::Data<AppServices>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let status = services.accounts.status(&user.user_id).await?;
    let code = if status.blacklist.is_some() { 403 } else { 200 };

    Ok(HttpResponse::Ok().json(ApiResponse::with_code(status, code)))
}

/// GDPR 데이터 내보내기
///
/// # Endpoint
/// `GET /auth/gdpr`
#[get("/gdpr")]
pub async fn gdpr(
    services: web::Data<AppServices>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let export = services.accounts.export(&user.user_id).await?;
    // 표시 이름은 사용자가 정하므로 제어 문자를 지우고 따옴표 처리는 헤더 타입에 맡깁니다
    let name: String = export.profile
        .as_ref()
        .map(|p| p.preferred_name.as_str())
        .unwrap_or(user.user_id.as_str())
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(format!("{}.json", name))],
    };

    log::info!("GDPR 내보내기: {}", user.user_id);

    Ok(HttpResponse::Ok().insert_header(disposition).json(export))
}

/// 계정 삭제
///
/// # Endpoint
/// `POST /auth/delete`
#[post("/delete")]
pub async fn delete_account(
    services: web::Data<AppServices>,
    query: web::Query<RedirectParams>,
    form: Option<web::Form<RedirectParams>>,
    user: AuthenticatedUser,
) -> HttpResponse {
    let redirect = redirect_param(query, form);
    let cookies = SessionCookies::new(&services);
    let reporter = ErrorReporter::new(cookies.clone(), redirect.clone());

    match services.accounts.delete_account(&user.user_id).await {
        Ok(()) => Completion::new(redirect.as_deref())
            .cookie(cookies.clear_token())
            .body(json!({ "deleted": true })),
        Err(e) => reporter.report(e),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::test;
    use chrono::Utc;
    use crate::clients::fakes::{FakeDiscord, FakeLastFm, FakeRoblox};
    use crate::core::registry::testing::{test_services, TestApp};
    use crate::domain::entities::accounts::BlacklistEntry;
    use crate::handlers::testing::{cookie_value, init_app, login_as, state_of};
    use super::*;

    const PHRASE: &str = "tiger otter lemur wasp gazelle";

    fn discord_app(roblox: FakeRoblox, phrases: &[&str]) -> TestApp {
        test_services(
            FakeDiscord::default().with_user("code-1", "access-1", FakeDiscord::user("d-1", "nelly")),
            FakeLastFm::default(),
            roblox,
            phrases,
        )
    }

    #[actix_web::test]
    async fn test_browser_login_round_trip() {
        let app = init_app!(discord_app(FakeRoblox::default(), &[]).services);

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/login/discord?redirect=https://app.example.com/done")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap().to_string();
        assert!(location.starts_with("https://discord.com/oauth2/authorize?client_id=client-id"));
        assert_eq!(cookie_value(&resp, "redirect").as_deref(), Some("https://app.example.com/done"));

        let uri = format!("/api/v1/auth/callback/discord?code=code-1&state={}", state_of(&location));
        let req = test::TestRequest::get()
            .uri(&uri)
            .cookie(Cookie::new("redirect", "https://app.example.com/done"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "https://app.example.com/done");
        assert_eq!(cookie_value(&resp, "redirect").as_deref(), Some(""));
        let token = cookie_value(&resp, "token").unwrap();
        assert!(!token.is_empty());

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/session")
            .cookie(Cookie::new("token", token))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"]["type"], "discord");
        assert_eq!(body["result"]["provider_id"], "d-1");
    }

    #[actix_web::test]
    async fn test_callback_failure_goes_back_to_redirect() {
        let app = init_app!(discord_app(FakeRoblox::default(), &[]).services);

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/callback/discord?error=access_denied&error_description=Cancelled")
            .cookie(Cookie::new("redirect", "https://app.example.com/done"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "https://app.example.com/done?error=Cancelled");

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/callback/discord?code=code-1&state=forged")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid OAuth state");
    }

    #[actix_web::test]
    async fn test_unknown_provider_is_not_found() {
        let app = init_app!(discord_app(FakeRoblox::default(), &[]).services);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/auth/login/github").to_request()).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_roblox_verification_over_http() {
        let TestApp { services, roblox, .. } = discord_app(
            FakeRoblox::default().with_user("builderman", 156, "Welcome to my place!"),
            &[PHRASE],
        );
        let app = init_app!(services);
        let token = login_as!(app, "code-1");

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/login/roblox?username=builderman")
            .cookie(Cookie::new("token", token.clone()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["code"], 200);
        assert_eq!(body["result"]["code"], PHRASE);
        assert_eq!(body["result"]["provider_id"], "156");
        assert_eq!(body["result"]["status"], "pending");

        roblox.set_description(156, "hello, my code is: tiger otter lemur wasp gazelle, thanks!");

        let verify = "/api/v1/auth/callback/roblox?code=tiger%20otter%20lemur%20wasp%20gazelle";
        let req = test::TestRequest::get().uri(verify).cookie(Cookie::new("token", token.clone())).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["result"]["action"], "updated");
        assert_eq!(body["result"]["provider"]["type"], "roblox");

        let req = test::TestRequest::get().uri(verify).cookie(Cookie::new("token", token)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Code already verified");
    }

    #[actix_web::test]
    async fn test_account_endpoints() {
        let TestApp { services, accounts, .. } = discord_app(FakeRoblox::default(), &[]);
        let app = init_app!(services);
        let token = login_as!(app, "code-1");
        let get = |uri: &str| {
            test::TestRequest::get().uri(uri).cookie(Cookie::new("token", token.clone())).to_request()
        };

        let body: serde_json::Value = test::call_and_read_body_json(&app, get("/api/v1/auth/providers")).await;
        assert_eq!(body["result"].as_array().unwrap().len(), 1);
        let user_id = body["result"][0]["user"].as_str().unwrap().to_string();

        let body: serde_json::Value = test::call_and_read_body_json(&app, get("/api/v1/auth/providers/lastfm")).await;
        assert!(body["result"].is_null());

        let body: serde_json::Value = test::call_and_read_body_json(&app, get("/api/v1/auth/status")).await;
        assert_eq!(body["code"], 200);
        assert_eq!(body["result"]["authenticated"], true);

        accounts
            .seed_blacklist(BlacklistEntry {
                id: "bl-1".to_string(),
                user: user_id,
                reason: Some("spam".to_string()),
                expires_at: None,
                created_at: Utc::now(),
            })
            .unwrap();
        let resp = test::call_service(&app, get("/api/v1/auth/status")).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 403);
        assert_eq!(body["result"]["blacklist"]["reason"], "spam");

        let resp = test::call_service(&app, get("/api/v1/auth/gdpr")).await;
        assert_eq!(resp.headers().get(header::CONTENT_DISPOSITION).unwrap(), "attachment; filename=\"nelly.json\"");
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["profile"]["preferred_name"], "nelly");
        assert_eq!(body["auth_providers"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/delete")
            .cookie(Cookie::new("token", token.clone()))
            .set_form([("redirect", "https://app.example.com/bye")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "https://app.example.com/bye");
        assert_eq!(cookie_value(&resp, "token").as_deref(), Some(""));

        let body: serde_json::Value = test::call_and_read_body_json(&app, get("/api/v1/auth/providers")).await;
        assert!(body["result"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_export_filename_is_quoted() {
        let services = test_services(
            FakeDiscord::default().with_user("code-2", "access-2", FakeDiscord::user("d-2", "a\"b;c=d")),
            FakeLastFm::default(),
            FakeRoblox::default(),
            &[],
        )
        .services;
        let app = init_app!(services);
        let token = login_as!(app, "code-2");

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/gdpr")
            .cookie(Cookie::new("token", token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"a\\\"b;c=d.json\""
        );
    }

    #[actix_web::test]
    async fn test_refresh_provider() {
        let app = init_app!(discord_app(FakeRoblox::default(), &[]).services);
        let token = login_as!(app, "code-1");

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/providers/discord")
            .cookie(Cookie::new("token", token.clone()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["code"], 200);
        assert_eq!(
            body["result"]["provider_avatar_url"],
            "https://cdn.discordapp.com/avatars/d-1/a_animated.gif"
        );

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/providers/lastfm?redirect=https://app.example.com/settings")
            .cookie(Cookie::new("token", token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "https://app.example.com/settings?error=Provider%20not%20supported"
        );
    }

    #[actix_web::test]
    async fn test_discord_logout_clears_session_cookie() {
        let app = init_app!(discord_app(FakeRoblox::default(), &[]).services);
        let token = login_as!(app, "code-1");

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/logout/discord")
            .cookie(Cookie::new("token", token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(cookie_value(&resp, "token").as_deref(), Some(""));
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["result"]["removed"], true);
    }

    #[actix_web::test]
    async fn test_account_endpoints_require_session() {
        let app = init_app!(discord_app(FakeRoblox::default(), &[]).services);

        for uri in ["/api/v1/auth/status", "/api/v1/auth/session", "/api/v1/auth/providers"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), 401, "{}", uri);
        }
    }
}
