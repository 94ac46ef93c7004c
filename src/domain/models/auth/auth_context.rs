//! 요청 컨텍스트
//!
//! 인증 미들웨어와 프로필, 워크스페이스, 봇 레이어가 각각 채운 값을
//! 하나의 구조체로 모아 핸들러 파라미터로 전달합니다.

use std::future::{ready, Ready};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use crate::domain::entities::bots::Bot;
use crate::domain::entities::profiles::Profile;
use crate::domain::entities::workspaces::{Workspace, WorkspaceMember};
use crate::domain::models::auth::AuthenticatedUser;
use crate::errors::{AppError, AppResult};

/// 강타입 요청 컨텍스트
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: AuthenticatedUser,
    pub profile: Option<Profile>,
    pub workspace: Option<Workspace>,
    pub member: Option<WorkspaceMember>,
    pub bot: Option<Bot>,
}

impl AuthContext {
    pub fn new(user: AuthenticatedUser) -> Self {
        Self {
            user,
            profile: None,
            workspace: None,
            member: None,
            bot: None,
        }
    }

    pub fn profile(&self) -> AppResult<&Profile> {
        self.profile
            .as_ref()
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    pub fn workspace(&self) -> AppResult<&Workspace> {
        self.workspace
            .as_ref()
            .ok_or_else(|| AppError::NotFound("Workspace not found".to_string()))
    }

    pub fn member(&self) -> AppResult<&WorkspaceMember> {
        self.member
            .as_ref()
            .ok_or_else(|| AppError::AuthorizationError("You are not a member of this workspace".to_string()))
    }

    pub fn bot(&self) -> AppResult<&Bot> {
        self.bot
            .as_ref()
            .ok_or_else(|| AppError::NotFound("Bot not found".to_string()))
    }
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let extensions = req.extensions();

        let Some(user) = extensions.get::<AuthenticatedUser>().cloned() else {
            return ready(Err(AppError::AuthenticationError(
                "You must be logged in to access this page!".to_string(),
            )
            .into()));
        };

        ready(Ok(AuthContext {
            user,
            profile: extensions.get::<Profile>().cloned(),
            workspace: extensions.get::<Workspace>().cloned(),
            member: extensions.get::<WorkspaceMember>().cloned(),
            bot: extensions.get::<Bot>().cloned(),
        }))
    }
}
