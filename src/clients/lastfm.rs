//! LastFM 웹 서비스 클라이언트
//!
//! LastFM은 OAuth가 아닌 자체 세션 키 교환을 사용합니다.
//! 인증 페이지에서 돌아온 `token`으로 `auth.getSession`을 호출하며,
//! 모든 서명 호출에는 `api_sig`가 필요합니다.
//!
//! ## api_sig
//!
//! `format`, `callback`을 제외한 파라미터를 이름순으로 정렬해 `<name><value>`로 이어 붙이고,
//! 공유 비밀을 덧붙인 문자열의 MD5 16진수 값입니다.

use std::collections::BTreeMap;
use async_trait::async_trait;
use md5::{Digest, Md5};
use crate::clients::transport_error;
use crate::config::LastFmConfig;
use crate::domain::models::providers::{LastFmErrorResponse, LastFmSession, LastFmSessionResponse};
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "LastFM";

#[async_trait]
pub trait LastFmApi: Send + Sync {
    /// 인증 토큰을 세션으로 교환합니다.
    async fn get_session(&self, token: &str) -> AppResult<LastFmSession>;
}

pub struct LastFmClient {
    http: reqwest::Client,
    config: LastFmConfig,
}

impl LastFmClient {
    pub fn new(http: reqwest::Client, config: LastFmConfig) -> Self {
        Self { http, config }
    }
}

/// 서명 대상 파라미터로부터 `api_sig`를 계산합니다.
pub fn sign(params: &BTreeMap<&str, &str>, secret: &str) -> String {
    let mut payload = String::new();
    for (key, value) in params.iter().filter(|(key, _)| !matches!(**key, "format" | "callback")) {
        payload.push_str(key);
        payload.push_str(value);
    }
    payload.push_str(secret);

    format!("{:x}", Md5::digest(payload.as_bytes()))
}

#[async_trait]
impl LastFmApi for LastFmClient {
    async fn get_session(&self, token: &str) -> AppResult<LastFmSession> {
        let mut params = BTreeMap::new();
        params.insert("method", "auth.getSession");
        params.insert("api_key", self.config.api_key.as_str());
        params.insert("token", token);

        let api_sig = sign(&params, &self.config.shared_secret);
        params.insert("api_sig", api_sig.as_str());
        params.insert("format", "json");

        let response = self.http
            .get(&self.config.api_base)
            .query(&params)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        // LastFM은 실패도 200 또는 4xx 본문의 `error` 필드로 알려줍니다
        if let Ok(error) = serde_json::from_str::<LastFmErrorResponse>(&body) {
            log::warn!("LastFM 세션 교환 거부 ({}): {}", error.error, error.message);
            return Err(AppError::ProviderError(error.message));
        }

        if !status.is_success() {
            return Err(AppError::ExternalServiceError(format!("LastFM 응답 실패: {}", status)));
        }

        serde_json::from_str::<LastFmSessionResponse>(&body)
            .map(|response| response.session)
            .map_err(|e| AppError::ExternalServiceError(format!("LastFM 응답 파싱 실패: {}", e)))
    }
}
