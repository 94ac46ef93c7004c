//! Roblox 공개 사용자 API 모델

use serde::{Deserialize, Serialize};

/// `POST /v1/usernames/users` 요청
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernamesRequest {
    pub usernames: Vec<String>,
    pub exclude_banned_users: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsernamesResponse {
    #[serde(default)]
    pub data: Vec<RobloxUserSummary>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobloxUserSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// `GET /v1/users/{id}` 응답
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobloxUser {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// 검증 문구를 찾는 공개 프로필 설명
    #[serde(default)]
    pub description: String,
}
