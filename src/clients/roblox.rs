//! Roblox 공개 사용자 API 클라이언트
//!
//! 인증이 필요 없는 `users.roblox.com` 엔드포인트만 사용합니다.

use async_trait::async_trait;
use reqwest::StatusCode;
use crate::clients::{read_json, transport_error};
use crate::config::RobloxConfig;
use crate::domain::models::providers::{RobloxUser, RobloxUserSummary, UsernamesRequest, UsernamesResponse};
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "Roblox";

#[async_trait]
pub trait RobloxApi: Send + Sync {
    /// 사용자명을 Roblox 사용자 ID로 해석합니다. 없는 사용자명이면 `None`.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<RobloxUserSummary>>;

    /// 공개 프로필(소개글 포함)을 조회합니다.
    async fn get_user(&self, user_id: &str) -> AppResult<RobloxUser>;
}

pub struct RobloxClient {
    http: reqwest::Client,
    config: RobloxConfig,
}

impl RobloxClient {
    pub fn new(http: reqwest::Client, config: RobloxConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.users_api_base.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl RobloxApi for RobloxClient {
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<RobloxUserSummary>> {
        let body = UsernamesRequest {
            usernames: vec![username.to_string()],
            exclude_banned_users: true,
        };

        let response = self.http
            .post(self.endpoint("/v1/usernames/users"))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let users: UsernamesResponse = read_json(SERVICE, response).await?;
        Ok(users.data.into_iter().next())
    }

    async fn get_user(&self, user_id: &str) -> AppResult<RobloxUser> {
        let response = self.http
            .get(self.endpoint(&format!("/v1/users/{}", urlencoding::encode(user_id))))
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Roblox user not found".to_string()));
        }

        read_json(SERVICE, response).await
    }
}
