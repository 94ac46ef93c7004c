//! Workspace HTTP Handlers
//!
//! 모든 엔드포인트는 인증과 프로필이 필요하며, `/{workspace_id}` 아래는 멤버십까지 확인된 상태로 들어옵니다.
//! 요청자 정보는 [`AuthContext`]로 받습니다.
//!
//! # Endpoints
//!
//! - `GET /workspaces`, `POST /workspaces`
//! - `GET /workspaces/{id}`, `PUT|POST /workspaces/{id}`
//! - `GET /workspaces/{id}/members?count=true`, `POST /workspaces/{id}/members`
//! - `GET|PUT|DELETE /workspaces/{id}/members/{member}`, `POST /workspaces/{id}/members/{member}/remove`
//! - `POST /workspaces/{id}/bot/create`, `GET|POST|DELETE /workspaces/{id}/bot`
//! - `GET /workspaces/{id}/analytics`
//! - `GET /workspaces/{id}/integrations`
//! - `POST /workspaces/{id}/integrations/enable/{iid}`, `POST /workspaces/{id}/integrations/disable/{iid}`
//! - `GET|POST /workspaces/{id}/integrations/{iid}`
//!
//! 멤버는 프로필 ID로 지정합니다. 봇 응답에는 토큰이 없습니다.

use actix_web::{delete, get, post, put, route, web, HttpResponse};
use serde::Deserialize;
use validator::Validate;
use crate::core::registry::AppServices;
use crate::domain::dto::{
    AddMemberRequest, ApiResponse, BotRequest, BotView, CreateWorkspaceRequest, RedirectParams,
    UpdateIntegrationRequest, UpdateMemberRequest, UpdateWorkspaceRequest,
};
use crate::domain::entities::workspaces::{Workspace, WorkspaceIntegration};
use crate::domain::models::auth::AuthContext;
use crate::errors::{AppError, AppResult};
use crate::handlers::responder::{redirect_param, Completion, ErrorReporter, SessionCookies};

#[derive(Debug, Deserialize)]
pub struct MemberPath {
    pub workspace_id: String,
    pub member: String,
}

#[derive(Debug, Deserialize)]
pub struct IntegrationPath {
    pub workspace_id: String,
    pub integration_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MembersQuery {
    #[serde(default)]
    pub count: bool,
}

/// # Endpoint
/// `GET /workspaces`
#[get("")]
pub async fn list_workspaces(
    services: web::Data<AppServices>,
    ctx: AuthContext,
) -> Result<HttpResponse, AppError> {
    let workspaces = services.workspaces.list(&ctx.profile()?.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(workspaces)))
}

/// 워크스페이스 생성
///
/// 유료 요금제는 구독을 먼저 만들고, 이후 단계가 실패하면 되돌립니다.
///
/// # Endpoint
/// `POST /workspaces`
#[post("")]
pub async fn create_workspace(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    payload: web::Json<CreateWorkspaceRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let workspace = services.workspaces.create(ctx.profile()?, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::created(workspace)))
}

/// # Endpoint
/// `GET /workspaces/{workspace_id}`
#[get("")]
pub async fn get_workspace(ctx: AuthContext) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ctx.workspace()?)))
}

async fn apply_update(
    services: &AppServices,
    ctx: &AuthContext,
    request: UpdateWorkspaceRequest,
) -> AppResult<Workspace> {
    request.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    services.workspaces
        .update(ctx.member()?, ctx.workspace()?, request)
        .await
}

/// 이름, 설명, 공개 범위 수정 (owner/admin)
///
/// # Endpoint
/// `PUT|POST /workspaces/{workspace_id}`
#[route("", method = "PUT", method = "POST")]
pub async fn update_workspace(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    query: web::Query<RedirectParams>,
    payload: web::Json<UpdateWorkspaceRequest>,
) -> HttpResponse {
    let redirect = query.into_inner().redirect;
    let reporter = ErrorReporter::new(SessionCookies::new(&services), redirect.clone());

    let result = apply_update(&services, &ctx, payload.into_inner())
        .await
        .map(|updated| Completion::new(redirect.as_deref()).body(updated));

    reporter.respond(result)
}

/// `?count=true`이면 멤버 수만 돌려줍니다.
///
/// # Endpoint
/// `GET /workspaces/{workspace_id}/members`
#[get("/members")]
pub async fn list_members(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    query: web::Query<MembersQuery>,
) -> Result<HttpResponse, AppError> {
    let members = services.workspaces.members(&ctx.workspace()?.id).await?;

    if query.count {
        return Ok(HttpResponse::Ok().json(ApiResponse::ok(members.len())));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::ok(members)))
}

/// Discord ID로 멤버를 초대합니다. 이미 멤버면 409.
///
/// # Endpoint
/// `POST /workspaces/{workspace_id}/members`
#[post("/members")]
pub async fn add_member(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    payload: web::Json<AddMemberRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let member = services.workspaces
        .add_member(ctx.member()?, ctx.workspace()?, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::created(member)))
}

/// # Endpoint
/// `GET /workspaces/{workspace_id}/members/{member}`
#[get("/members/{member}")]
pub async fn get_member(
    services: web::Data<AppServices>,
    path: web::Path<MemberPath>,
) -> Result<HttpResponse, AppError> {
    let member = services.workspaces.get_member(&path.workspace_id, &path.member).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(member)))
}

/// 역할 변경 (owner/admin)
///
/// # Endpoint
/// `PUT /workspaces/{workspace_id}/members/{member}`
#[put("/members/{member}")]
pub async fn update_member(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    path: web::Path<MemberPath>,
    payload: web::Json<UpdateMemberRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let member = services.workspaces
        .update_member(ctx.member()?, &path.workspace_id, &path.member, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(member)))
}

async fn remove(services: &AppServices, ctx: &AuthContext, path: &MemberPath) -> AppResult<()> {
    services.workspaces
        .remove_member(ctx.member()?, &path.workspace_id, &path.member)
        .await
}

/// # Endpoint
/// `DELETE /workspaces/{workspace_id}/members/{member}`
#[delete("/members/{member}")]
pub async fn delete_member(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    path: web::Path<MemberPath>,
) -> Result<HttpResponse, AppError> {
    remove(&services, &ctx, &path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(true)))
}

/// 폼 제출용 멤버 제거. 폼의 `redirect`가 있으면 302.
///
/// # Endpoint
/// `POST /workspaces/{workspace_id}/members/{member}/remove`
#[post("/members/{member}/remove")]
pub async fn remove_member(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    path: web::Path<MemberPath>,
    query: web::Query<RedirectParams>,
    form: Option<web::Form<RedirectParams>>,
) -> HttpResponse {
    let redirect = redirect_param(query, form);
    let reporter = ErrorReporter::new(SessionCookies::new(&services), redirect.clone());

    match remove(&services, &ctx, &path).await {
        Ok(()) => Completion::new(redirect.as_deref()).body(true),
        Err(e) => reporter.report(e),
    }
}

async fn register_bot(services: &AppServices, ctx: &AuthContext, request: BotRequest) -> AppResult<BotView> {
    request.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let bot = services.bots
        .create(ctx.member()?, &ctx.user.user_id, ctx.workspace()?, request)
        .await?;
    Ok(BotView::from(bot))
}

/// 봇 등록 (owner/admin)
///
/// Discord가 토큰을 거부하면 422 `Invalid token`.
///
/// # Endpoint
/// `POST /workspaces/{workspace_id}/bot/create`
#[post("/bot/create")]
pub async fn create_bot(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    query: web::Query<RedirectParams>,
    payload: web::Json<BotRequest>,
) -> HttpResponse {
    let redirect = query.into_inner().redirect;
    let reporter = ErrorReporter::new(SessionCookies::new(&services), redirect.clone());

    let result = register_bot(&services, &ctx, payload.into_inner())
        .await
        .map(|bot| Completion::new(redirect.as_deref()).body(bot));

    reporter.respond(result)
}

/// # Endpoint
/// `GET /workspaces/{workspace_id}/bot`
#[get("")]
pub async fn get_bot(ctx: AuthContext) -> Result<HttpResponse, AppError> {
    let bot = BotView::from(ctx.bot()?.clone());
    Ok(HttpResponse::Ok().json(ApiResponse::ok(bot)))
}

async fn apply_bot_update(services: &AppServices, ctx: &AuthContext, request: BotRequest) -> AppResult<BotView> {
    request.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let bot = services.bots.update(ctx.member()?, ctx.bot()?, request).await?;
    Ok(BotView::from(bot))
}

/// 설정은 주어진 키만 덮어씁니다 (owner/admin)
///
/// # Endpoint
/// `POST /workspaces/{workspace_id}/bot`
#[post("")]
pub async fn update_bot(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    query: web::Query<RedirectParams>,
    payload: web::Json<BotRequest>,
) -> HttpResponse {
    let redirect = query.into_inner().redirect;
    let reporter = ErrorReporter::new(SessionCookies::new(&services), redirect.clone());

    let result = apply_bot_update(&services, &ctx, payload.into_inner())
        .await
        .map(|bot| Completion::new(redirect.as_deref()).body(bot));

    reporter.respond(result)
}

/// # Endpoint
/// `DELETE /workspaces/{workspace_id}/bot`
#[delete("")]
pub async fn delete_bot(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    query: web::Query<RedirectParams>,
) -> HttpResponse {
    let redirect = query.into_inner().redirect;
    let reporter = ErrorReporter::new(SessionCookies::new(&services), redirect.clone());

    let result = match (ctx.member(), ctx.bot()) {
        (Ok(member), Ok(bot)) => services.bots.delete(member, bot).await,
        (Err(e), _) | (_, Err(e)) => Err(e),
    };

    match result {
        Ok(()) => Completion::new(redirect.as_deref()).body(true),
        Err(e) => reporter.report(e),
    }
}

/// 봇 사용량 기록, 최신순. 봇이 없으면 `result: null`.
///
/// # Endpoint
/// `GET /workspaces/{workspace_id}/analytics`
#[get("/analytics")]
pub async fn analytics(
    services: web::Data<AppServices>,
    ctx: AuthContext,
) -> Result<HttpResponse, AppError> {
    let rows = services.bots.analytics(&ctx.workspace()?.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}

/// # Endpoint
/// `GET /workspaces/{workspace_id}/integrations`
#[get("/integrations")]
pub async fn list_integrations(
    services: web::Data<AppServices>,
    ctx: AuthContext,
) -> Result<HttpResponse, AppError> {
    let integrations = services.integrations.list(&ctx.workspace()?.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(integrations)))
}

async fn toggle(
    services: &AppServices,
    ctx: &AuthContext,
    path: &IntegrationPath,
    enabled: bool,
) -> AppResult<WorkspaceIntegration> {
    let member = ctx.member()?;
    if enabled {
        services.integrations.enable(member, &path.workspace_id, &path.integration_id).await
    } else {
        services.integrations.disable(member, &path.workspace_id, &path.integration_id).await
    }
}

async fn respond_toggle(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    path: web::Path<IntegrationPath>,
    redirect: Option<String>,
    enabled: bool,
) -> HttpResponse {
    let reporter = ErrorReporter::new(SessionCookies::new(&services), redirect.clone());

    match toggle(&services, &ctx, &path, enabled).await {
        Ok(integration) => Completion::new(redirect.as_deref()).body(integration),
        Err(e) => reporter.report(e),
    }
}

/// 레코드가 없으면 만들면서 켭니다 (owner/admin)
///
/// # Endpoint
/// `POST /workspaces/{workspace_id}/integrations/enable/{integration_id}`
#[post("/integrations/enable/{integration_id}")]
pub async fn enable_integration(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    path: web::Path<IntegrationPath>,
    query: web::Query<RedirectParams>,
    form: Option<web::Form<RedirectParams>>,
) -> HttpResponse {
    let redirect = redirect_param(query, form);
    respond_toggle(services, ctx, path, redirect, true).await
}

/// # Endpoint
/// `POST /workspaces/{workspace_id}/integrations/disable/{integration_id}`
#[post("/integrations/disable/{integration_id}")]
pub async fn disable_integration(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    path: web::Path<IntegrationPath>,
    query: web::Query<RedirectParams>,
    form: Option<web::Form<RedirectParams>>,
) -> HttpResponse {
    let redirect = redirect_param(query, form);
    respond_toggle(services, ctx, path, redirect, false).await
}

/// 봇이 있는 워크스페이스에서만 열립니다.
///
/// # Endpoint
/// `GET /workspaces/{workspace_id}/integrations/{integration_id}`
#[get("")]
pub async fn get_integration(
    services: web::Data<AppServices>,
    path: web::Path<IntegrationPath>,
) -> Result<HttpResponse, AppError> {
    let integration = services.integrations.get(&path.workspace_id, &path.integration_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(integration)))
}

/// 설정 객체 전체 교체 (owner/admin)
///
/// # Endpoint
/// `POST /workspaces/{workspace_id}/integrations/{integration_id}`
#[post("")]
pub async fn update_integration(
    services: web::Data<AppServices>,
    ctx: AuthContext,
    path: web::Path<IntegrationPath>,
    query: web::Query<RedirectParams>,
    payload: web::Json<UpdateIntegrationRequest>,
) -> HttpResponse {
    let redirect = query.into_inner().redirect;
    let reporter = ErrorReporter::new(SessionCookies::new(&services), redirect.clone());

    let result = match ctx.member() {
        Ok(member) => services.integrations
            .update_settings(member, &path.workspace_id, &path.integration_id, payload.into_inner())
            .await
            .map(|integration| Completion::new(redirect.as_deref()).body(integration)),
        Err(e) => Err(e),
    };

    reporter.respond(result)
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::http::header;
    use actix_web::test;
    use serde_json::json;
    use crate::clients::fakes::{FakeDiscord, FakeLastFm, FakeRoblox};
    use crate::core::registry::testing::{test_services, TestApp};
    use crate::domain::entities::bots::BotAnalytics;
    use crate::handlers::testing::{init_app, login_as};

    fn two_users() -> TestApp {
        test_services(
            FakeDiscord::default()
                .with_user("code-1", "access-1", FakeDiscord::user("d-1", "nelly"))
                .with_user("code-2", "access-2", FakeDiscord::user("d-2", "otto")),
            FakeLastFm::default(),
            FakeRoblox::default(),
            &[],
        )
    }

    #[actix_web::test]
    async fn test_workspace_lifecycle() {
        let TestApp { services, billing, .. } = two_users();
        let app = init_app!(services);
        let owner = login_as!(app, "code-1");
        let guest = login_as!(app, "code-2");

        let as_user = |req: test::TestRequest, token: &str| req.cookie(Cookie::new("token", token.to_string())).to_request();

        let req = as_user(
            test::TestRequest::post().uri("/api/v1/workspaces").set_json(json!({ "name": "  Team  ", "plan": "pro" })),
            &owner,
        );
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 201);
        assert_eq!(body["result"]["name"], "Team");
        assert_eq!(body["result"]["plan"], 3);
        let workspace_id = body["result"]["id"].as_str().unwrap().to_string();
        assert_eq!(billing.subscriptions.lock().unwrap().len(), 1);

        let body: serde_json::Value =
            test::call_and_read_body_json(&app, as_user(test::TestRequest::get().uri("/api/v1/workspaces"), &owner)).await;
        assert_eq!(body["result"].as_array().unwrap().len(), 1);

        let base = format!("/api/v1/workspaces/{}", workspace_id);
        let resp = test::call_service(&app, as_user(test::TestRequest::get().uri(&base), &guest)).await;
        assert_eq!(resp.status(), 403);

        let req = as_user(
            test::TestRequest::put().uri(&base).set_json(json!({ "name": "Renamed", "visibility": "public" })),
            &owner,
        );
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"]["name"], "Renamed");
        assert_eq!(body["result"]["visibility"], "public");

        let members = format!("{}/members", base);
        let req = as_user(test::TestRequest::post().uri(&members).set_json(json!({ "discord": "d-2" })), &owner);
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["result"]["pending"], true);
        assert_eq!(body["result"]["role"], "member");
        let guest_id = body["result"]["profile"].as_str().unwrap().to_string();

        let req = as_user(test::TestRequest::post().uri(&members).set_json(json!({ "discord": "d-2" })), &owner);
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);

        let req = as_user(test::TestRequest::get().uri(&format!("{}?count=true", members)), &owner);
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"], 2);

        let member = format!("{}/{}", members, guest_id);
        let req = as_user(test::TestRequest::put().uri(&member).set_json(json!({ "role": "admin" })), &owner);
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"]["role"], "admin");

        let body: serde_json::Value =
            test::call_and_read_body_json(&app, as_user(test::TestRequest::get().uri(&member), &guest)).await;
        assert_eq!(body["result"]["role"], "admin");

        let req = as_user(
            test::TestRequest::post()
                .uri(&format!("{}/remove", member))
                .set_form([("redirect", "https://app.example.com/workspaces")]),
            &guest,
        );
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "https://app.example.com/workspaces");

        let resp = test::call_service(&app, as_user(test::TestRequest::get().uri(&member), &owner)).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_workspace_rules() {
        let app = init_app!(two_users().services);
        let owner = login_as!(app, "code-1");

        let req = test::TestRequest::post()
            .uri("/api/v1/workspaces")
            .cookie(Cookie::new("token", owner.clone()))
            .set_json(json!({ "name": "", "plan": "free" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::post()
            .uri("/api/v1/workspaces")
            .cookie(Cookie::new("token", owner.clone()))
            .set_json(json!({ "name": "Free team", "plan": "free" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let workspace_id = body["result"]["id"].as_str().unwrap().to_string();
        let owner_id = body["result"]["owner"].as_str().unwrap().to_string();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/workspaces/{}/members/{}", workspace_id, owner_id))
            .cookie(Cookie::new("token", owner.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "The workspace owner cannot be removed");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/workspaces").to_request()).await;
        assert_eq!(resp.status(), 401);
    }

    fn with_bot_token() -> TestApp {
        test_services(
            FakeDiscord::default()
                .with_user("code-1", "access-1", FakeDiscord::user("d-1", "nelly"))
                .with_user("code-2", "access-2", FakeDiscord::user("d-2", "otto"))
                .with_bot("bot-token", FakeDiscord::user("b-1", "helper")),
            FakeLastFm::default(),
            FakeRoblox::default(),
            &[],
        )
    }

    #[actix_web::test]
    async fn test_workspace_bot_and_analytics() {
        let TestApp { services, bots, .. } = with_bot_token();
        let app = init_app!(services);
        let owner = login_as!(app, "code-1");
        let guest = login_as!(app, "code-2");
        let as_user = |req: test::TestRequest, token: &str| req.cookie(Cookie::new("token", token.to_string())).to_request();

        let req = as_user(
            test::TestRequest::post().uri("/api/v1/workspaces").set_json(json!({ "name": "Team", "plan": "free" })),
            &owner,
        );
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let base = format!("/api/v1/workspaces/{}", body["result"]["id"].as_str().unwrap());
        let req = as_user(
            test::TestRequest::post().uri(&format!("{}/members", base)).set_json(json!({ "discord": "d-2" })),
            &owner,
        );
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        let resp = test::call_service(&app, as_user(test::TestRequest::get().uri(&format!("{}/bot", base)), &owner)).await;
        assert_eq!(resp.status(), 404);
        let body: serde_json::Value =
            test::call_and_read_body_json(&app, as_user(test::TestRequest::get().uri(&format!("{}/analytics", base)), &owner)).await;
        assert!(body["result"].is_null());

        let create = format!("{}/bot/create", base);
        let req = as_user(test::TestRequest::post().uri(&create).set_json(json!({ "token": "forged" })), &owner);
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid token");
        assert_eq!(body["code"], 422);

        let req = as_user(test::TestRequest::post().uri(&create).set_json(json!({ "token": "bot-token" })), &guest);
        assert_eq!(test::call_service(&app, req).await.status(), 403);

        let req = as_user(
            test::TestRequest::post().uri(&create).set_json(json!({ "token": "bot-token", "region": "us" })),
            &owner,
        );
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"]["region"], "us");
        assert_eq!(body["result"]["settings"]["activityInterval"], 300);
        assert!(body["result"].get("token").is_none());
        let bot_id = body["result"]["id"].as_str().unwrap().to_string();

        let req = as_user(test::TestRequest::post().uri(&create).set_json(json!({ "token": "bot-token" })), &owner);
        assert_eq!(test::call_service(&app, req).await.status(), 409);

        let bot = format!("{}/bot", base);
        let body: serde_json::Value = test::call_and_read_body_json(&app, as_user(test::TestRequest::get().uri(&bot), &guest)).await;
        assert_eq!(body["result"]["id"], bot_id.as_str());
        assert!(body["result"].get("token").is_none());

        let req = as_user(
            test::TestRequest::post().uri(&bot).set_json(json!({ "settings": { "prefix": "?" } })),
            &owner,
        );
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"]["settings"]["prefix"], "?");
        assert_eq!(body["result"]["settings"]["status"], "online");

        let req = as_user(
            test::TestRequest::post().uri(&bot).set_json(json!({ "settings": { "prefix": "!" } })),
            &guest,
        );
        assert_eq!(test::call_service(&app, req).await.status(), 403);

        let now = chrono::Utc::now();
        for (hours, commands) in [(3, 1), (1, 2)] {
            bots.seed_analytics(BotAnalytics {
                bot: bot_id.clone(),
                commands,
                members: 5,
                messages: 9,
                timestamp: now - chrono::Duration::hours(hours),
            })
            .unwrap();
        }
        let body: serde_json::Value =
            test::call_and_read_body_json(&app, as_user(test::TestRequest::get().uri(&format!("{}/analytics", base)), &guest)).await;
        assert_eq!(body["result"][0]["commands"], 2);
        assert_eq!(body["result"][1]["commands"], 1);

        let resp = test::call_service(&app, as_user(test::TestRequest::delete().uri(&bot), &owner)).await;
        assert_eq!(resp.status(), 200);
        let resp = test::call_service(&app, as_user(test::TestRequest::get().uri(&bot), &owner)).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_workspace_integrations() {
        let TestApp { services, .. } = with_bot_token();
        let app = init_app!(services);
        let owner = login_as!(app, "code-1");
        let guest = login_as!(app, "code-2");
        let as_user = |req: test::TestRequest, token: &str| req.cookie(Cookie::new("token", token.to_string())).to_request();

        let req = as_user(
            test::TestRequest::post().uri("/api/v1/workspaces").set_json(json!({ "name": "Team", "plan": "free" })),
            &owner,
        );
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let base = format!("/api/v1/workspaces/{}", body["result"]["id"].as_str().unwrap());
        let req = as_user(
            test::TestRequest::post().uri(&format!("{}/members", base)).set_json(json!({ "discord": "d-2" })),
            &owner,
        );
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        let enable = format!("{}/integrations/enable/leveling", base);
        let body: serde_json::Value = test::call_and_read_body_json(&app, as_user(test::TestRequest::post().uri(&enable), &owner)).await;
        assert_eq!(body["result"]["enabled"], true);
        let integration_id = body["result"]["id"].as_str().unwrap().to_string();

        let req = as_user(
            test::TestRequest::post()
                .uri(&format!("{}/integrations/disable/leveling", base))
                .set_form([("redirect", "https://app.example.com/integrations")]),
            &owner,
        );
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "https://app.example.com/integrations");

        let resp = test::call_service(&app, as_user(test::TestRequest::post().uri(&enable), &guest)).await;
        assert_eq!(resp.status(), 403);

        let body: serde_json::Value =
            test::call_and_read_body_json(&app, as_user(test::TestRequest::get().uri(&format!("{}/integrations", base)), &guest)).await;
        let rows = body["result"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], integration_id.as_str());
        assert_eq!(rows[0]["enabled"], false);

        // 상세 경로는 봇이 있어야 열립니다
        let detail = format!("{}/integrations/leveling", base);
        let resp = test::call_service(&app, as_user(test::TestRequest::get().uri(&detail), &owner)).await;
        assert_eq!(resp.status(), 404);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Bot not found");

        let req = as_user(
            test::TestRequest::post().uri(&format!("{}/bot/create", base)).set_json(json!({ "token": "bot-token" })),
            &owner,
        );
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let resp = test::call_service(
            &app,
            as_user(test::TestRequest::get().uri(&format!("{}/integrations/welcome", base)), &owner),
        )
        .await;
        assert_eq!(resp.status(), 404);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Integration not found");

        let req = as_user(
            test::TestRequest::post().uri(&detail).set_json(json!({ "settings": { "channel": "123" } })),
            &owner,
        );
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"]["settings"]["channel"], "123");

        let req = as_user(test::TestRequest::post().uri(&detail).set_json(json!({ "settings": {} })), &guest);
        assert_eq!(test::call_service(&app, req).await.status(), 403);

        let body: serde_json::Value = test::call_and_read_body_json(&app, as_user(test::TestRequest::get().uri(&detail), &guest)).await;
        assert_eq!(body["result"]["settings"], json!({ "channel": "123" }));
        assert_eq!(body["result"]["enabled"], false);
    }
}
