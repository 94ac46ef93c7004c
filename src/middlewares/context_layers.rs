//! 요청 컨텍스트 레이어
//!
//! 인증 미들웨어 뒤에서 요청 확장에 한 필드씩 더합니다.
//!
//! - [`load_profile`]: 인증된 사용자의 [`Profile`]
//! - [`load_workspace`]: 경로의 `{workspace_id}` 워크스페이스와 요청자의 [`WorkspaceMember`]
//! - [`load_bot`]: 그 워크스페이스의 [`Bot`]
//!
//! 핸들러는 [`AuthContext`](crate::domain::models::auth::AuthContext) 추출자로 한 번에 받습니다.
//!
//! ```rust,ignore
//! web::scope("/workspaces")
//!     .wrap(from_fn(load_profile))
//!     .wrap(AuthMiddleware::required())
//! ```

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage, ResponseError};
use crate::core::registry::AppServices;
use crate::domain::entities::bots::Bot;
use crate::domain::entities::profiles::Profile;
use crate::domain::entities::workspaces::Workspace;
use crate::domain::models::auth::AuthenticatedUser;
use crate::errors::AppError;

fn services(req: &ServiceRequest) -> Result<web::Data<AppServices>, AppError> {
    req.app_data::<web::Data<AppServices>>()
        .cloned()
        .ok_or_else(|| AppError::InternalError("AppServices가 등록되지 않았습니다".to_string()))
}

/// 레이어 실패는 에러로 전파하지 않고 JSON 봉투 응답으로 바로 돌려줍니다.
async fn continue_or_reject<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
    result: Result<(), AppError>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    match result {
        Ok(()) => Ok(next.call(req).await?.map_into_left_body()),
        Err(e) => {
            log::debug!("요청 컨텍스트 구성 실패: {} ({})", e, req.path());
            Ok(req.into_response(e.error_response()).map_into_right_body())
        }
    }
}

async fn attach_profile(req: &ServiceRequest) -> Result<(), AppError> {
    let user = req.extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthenticationError("You must be logged in to access this page!".to_string()))?;

    let profile = services(req)?.accounts.profile(&user.user_id).await?;
    req.extensions_mut().insert(profile);
    Ok(())
}

async fn attach_workspace(req: &ServiceRequest) -> Result<(), AppError> {
    let workspace_id = req.match_info()
        .get("workspace_id")
        .map(str::to_string)
        .ok_or_else(|| AppError::ValidationError("You must provide a workspace ID!".to_string()))?;

    let profile_id = req.extensions()
        .get::<Profile>()
        .map(|p| p.id.clone())
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let services = services(req)?;
    let workspace = services.workspaces.get(&workspace_id).await?;
    let member = services.workspaces.membership(&workspace.id, &profile_id).await?;

    log::debug!("워크스페이스 컨텍스트: {} ({:?})", workspace.id, member.role);
    req.extensions_mut().insert(workspace);
    req.extensions_mut().insert(member);
    Ok(())
}

async fn attach_bot(req: &ServiceRequest) -> Result<(), AppError> {
    let workspace_id = req.extensions()
        .get::<Workspace>()
        .map(|w| w.id.clone())
        .ok_or_else(|| AppError::NotFound("Workspace not found".to_string()))?;

    let bot: Bot = services(req)?.bots.get(&workspace_id).await?;
    req.extensions_mut().insert(bot);
    Ok(())
}

/// 프로필 레이어
pub async fn load_profile<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let result = attach_profile(&req).await;
    continue_or_reject(req, next, result).await
}

/// 워크스페이스 레이어
///
/// 프로필 레이어 뒤에 두어야 합니다. 멤버가 아니면 403.
pub async fn load_workspace<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let result = attach_workspace(&req).await;
    continue_or_reject(req, next, result).await
}

/// 봇 레이어
///
/// 워크스페이스 레이어 뒤에 두어야 합니다. 봇이 없으면 404.
pub async fn load_bot<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let result = attach_bot(&req).await;
    continue_or_reject(req, next, result).await
}

#[cfg(test)]
mod tests {
    use actix_web::middleware::from_fn;
    use actix_web::{test, App, HttpResponse};
    use chrono::Utc;
    use crate::clients::fakes::{FakeDiscord, FakeLastFm, FakeRoblox};
    use crate::core::registry::testing::{test_config, test_services, TestApp};
    use crate::domain::entities::providers::ProviderData;
    use crate::domain::entities::workspaces::{Plan, Visibility, Workspace, WorkspaceMember, WorkspaceRole};
    use crate::domain::models::auth::AuthContext;
    use crate::domain::models::identity::ProviderIdentity;
    use crate::middlewares::AuthMiddleware;
    use crate::repositories::{BotRepository, ProfileRepository, WorkspaceRepository};
    use crate::services::auth::providers::testing::anchor;
    use crate::services::auth::TokenService;
    use super::*;

    async fn context(ctx: AuthContext) -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({
            "profile": ctx.profile.map(|p| p.id),
            "workspace": ctx.workspace.map(|w| w.id),
            "role": ctx.member.map(|m| m.role),
            "bot": ctx.bot.map(|b| b.id),
        }))
    }

    async fn seed_profile(app: &TestApp, user_id: &str) -> String {
        let user = anchor(user_id);
        let identity = ProviderIdentity {
            native_id: user.subject.clone(),
            display_name: user_id.to_string(),
            access_token: None,
            refresh_token: None,
            expires_at: None,
            avatar_url: None,
            banner_url: None,
            email: None,
            email_verified: false,
            data: ProviderData::Discord(Default::default()),
        };
        app.profiles.insert(&Profile::from_anchor(user_id, &identity, None, Utc::now())).await.unwrap();
        TokenService::new(&test_config().jwt).issue(&user.subject, &user.provider).unwrap()
    }

    #[actix_web::test]
    async fn test_layers_fill_auth_context() {
        let app = test_services(FakeDiscord::default(), FakeLastFm::default(), FakeRoblox::default(), &[]);
        let owner_token = seed_profile(&app, "owner").await;
        let outsider_token = seed_profile(&app, "outsider").await;
        let no_profile_token = {
            let user = anchor("ghost");
            TokenService::new(&test_config().jwt).issue(&user.subject, &user.provider).unwrap()
        };

        let workspace = Workspace::new("owner", "Team", "", Visibility::Private, Plan::Free, None, Utc::now());
        app.workspaces.insert_workspace(&workspace).await.unwrap();
        app.workspaces
            .insert_member(&WorkspaceMember::new(&workspace.id, "owner", WorkspaceRole::Owner, Utc::now()))
            .await
            .unwrap();

        let service = test::init_service(
            App::new().app_data(web::Data::new(app.services)).service(
                web::scope("/workspaces")
                    .wrap(from_fn(load_profile))
                    .wrap(AuthMiddleware::required())
                    .route("", web::get().to(context))
                    .service(
                        web::scope("/{workspace_id}")
                            .wrap(from_fn(load_workspace))
                            .route("", web::get().to(context))
                            .service(web::scope("/bot").wrap(from_fn(load_bot)).route("", web::get().to(context))),
                    ),
            ),
        )
        .await;

        let bearer = |token: &str| (actix_web::http::header::AUTHORIZATION, format!("Bearer {}", token));

        let req = test::TestRequest::get().uri("/workspaces").insert_header(bearer(&owner_token)).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["profile"], "owner");
        assert!(body["workspace"].is_null());

        let uri = format!("/workspaces/{}", workspace.id);
        let req = test::TestRequest::get().uri(&uri).insert_header(bearer(&owner_token)).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["workspace"], workspace.id.as_str());
        assert_eq!(body["role"], "owner");

        let bot_uri = format!("/workspaces/{}/bot", workspace.id);
        let req = test::TestRequest::get().uri(&bot_uri).insert_header(bearer(&owner_token)).to_request();
        let response = test::call_service(&service, req).await;
        assert_eq!(response.status(), 404);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "Bot not found");

        let bot = Bot::new(&workspace.id, "owner", "bot-token", Default::default(), Utc::now());
        app.bots.insert(&bot).await.unwrap();
        let req = test::TestRequest::get().uri(&bot_uri).insert_header(bearer(&owner_token)).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["bot"], bot.id.as_str());

        let req = test::TestRequest::get().uri(&uri).insert_header(bearer(&outsider_token)).to_request();
        assert_eq!(test::call_service(&service, req).await.status(), 403);

        let req = test::TestRequest::get().uri("/workspaces/missing").insert_header(bearer(&owner_token)).to_request();
        assert_eq!(test::call_service(&service, req).await.status(), 404);

        let req = test::TestRequest::get().uri("/workspaces").insert_header(bearer(&no_profile_token)).to_request();
        assert_eq!(test::call_service(&service, req).await.status(), 404);
    }
}
