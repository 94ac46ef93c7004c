//! # 외부 API 클라이언트
//!
//! 아이덴티티 프로바이더(Discord, LastFM, Roblox)와 결제 프로바이더에 대한
//! 아웃바운드 호출을 `async_trait` 능력(capability) 계약 뒤에 둡니다.
//! 서비스는 계약에만 의존하고, 테스트는 [`fakes`]의 가짜 구현을 주입합니다.
//!
//! 모든 구현은 하나의 `reqwest::Client`를 공유하며, 이 클라이언트에 걸린 타임아웃이
//! 느린 외부 의존성이 워커를 붙잡지 못하게 합니다. 인바운드 요청 future가 drop 되면
//! 진행 중인 아웃바운드 호출도 함께 취소됩니다.
//!
//! ## 에러 분류
//!
//! | 상황 | AppError |
//! |------|----------|
//! | 프로바이더가 교환을 거부 (4xx, LastFM `error` 응답) | `ProviderError` |
//! | 네트워크 실패, 5xx, 응답 파싱 실패 | `ExternalServiceError` |

pub mod billing;
pub mod discord;
pub mod lastfm;
pub mod roblox;

#[cfg(test)]
pub mod fakes;

pub use billing::*;
pub use discord::*;
pub use lastfm::*;
pub use roblox::*;

use std::time::Duration;
use reqwest::Response;
use serde::de::DeserializeOwned;
use crate::config::HttpClientConfig;
use crate::errors::{AppError, AppResult};

/// 공유 HTTP 클라이언트를 만듭니다.
pub fn build_http_client(config: &HttpClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("identity_link_backend/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// 전송 실패를 ExternalServiceError로 변환합니다.
pub(crate) fn transport_error(service: &str, error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        AppError::ExternalServiceError(format!("{} 요청 시간 초과", service))
    } else {
        AppError::ExternalServiceError(format!("{} 요청 실패: {}", service, error))
    }
}

/// 성공 응답이면 JSON 본문을 파싱하고, 4xx는 ProviderError, 그 외 실패는 ExternalServiceError로 반환합니다.
pub(crate) async fn read_json<T: DeserializeOwned>(service: &str, response: Response) -> AppResult<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        log::warn!("{} 응답 실패 ({}): {}", service, status, error_text);

        return Err(if status.is_client_error() {
            AppError::ProviderError(format!("{} rejected the request ({})", service, status.as_u16()))
        } else {
            AppError::ExternalServiceError(format!("{} 응답 실패: {}", service, status))
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AppError::ExternalServiceError(format!("{} 응답 파싱 실패: {}", service, e)))
}
