//! Roblox 어댑터 (프로필 설명 검증)
//!
//! OAuth 단계가 없습니다. 대신 사람이 입력할 수 있는 검증 문구를 발급하고,
//! 사용자가 자신의 Roblox 프로필 소개글에 그 문구를 넣었는지 나중에 확인합니다.
//!
//! ## 상태 전이
//!
//! ```text
//!   (없음) ──발급──▶ pending ──검증 성공──▶ verified
//!                     │  ▲
//!                     └──┘ 재발급 (같은 사용자명이면 같은 문구)
//! ```
//!
//! - `verified` 레코드에 대한 발급/검증 요청은 항상 `Conflict`
//! - 검증 실패(문구 불일치, 코드 없음)는 상태를 바꾸지 않으며, 재시도는 호출자가 결정합니다
//! - `pending → verified` 전이는 저장소의 compare-and-swap으로 한 번만 일어납니다

use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use crate::clients::RobloxApi;
use crate::config::{AuthProvider, ChallengeLength};
use crate::domain::dto::auth::ChallengeIssued;
use crate::domain::entities::providers::{LinkedProvider, ProviderData, RobloxChallengeState};
use crate::domain::models::auth::AuthenticatedUser;
use crate::domain::models::providers::RobloxUserSummary;
use crate::errors::{AppError, AppResult};
use crate::repositories::ProviderRepository;
use crate::services::auth::challenge::{is_well_formed, PhraseSource};
use super::{reported_error, LoginFlow, LoginOutcome, LoginStart, LogoutOutcome, ProviderRequest};

/// 이미 쓰이고 있는 문구와 겹칠 때 다시 뽑는 횟수
const PHRASE_ATTEMPTS: usize = 3;

pub struct RobloxProvider {
    api: Arc<dyn RobloxApi>,
    providers: Arc<dyn ProviderRepository>,
    phrases: Arc<dyn PhraseSource>,
    length: ChallengeLength,
}

fn code_not_found() -> AppError {
    AppError::NotFound("Code not found".to_string())
}

fn already_verified() -> AppError {
    AppError::ConflictError("Code already verified".to_string())
}

fn claimed_by_other_user() -> AppError {
    AppError::ConflictError("This Roblox account is already linked to another user".to_string())
}

fn issued(row: &LinkedProvider, challenge: &RobloxChallengeState) -> ChallengeIssued {
    ChallengeIssued {
        code: challenge.code.clone(),
        username: challenge.username.clone(),
        provider_id: row.provider_id.clone(),
        status: challenge.status,
    }
}

impl RobloxProvider {
    /// # Arguments
    ///
    /// * `phrases` - 검증 문구 생성기
    /// * `length` - 문구 단어 수 (5 또는 8)
    pub fn new(
        api: Arc<dyn RobloxApi>,
        providers: Arc<dyn ProviderRepository>,
        phrases: Arc<dyn PhraseSource>,
        length: ChallengeLength,
    ) -> Self {
        Self { api, providers, phrases, length }
    }

    /// 다른 대기 중 레코드와 겹치지 않는 문구를 만듭니다.
    async fn unique_phrase(&self) -> AppResult<String> {
        for _ in 0..PHRASE_ATTEMPTS {
            let phrase = self.phrases.phrase(self.length);
            if self.providers.find_by_challenge_code(&phrase).await?.is_none() {
                return Ok(phrase);
            }
            log::debug!("검증 문구 충돌, 다시 생성");
        }

        Err(AppError::InternalError("Could not generate a unique verification code".to_string()))
    }

    /// 기존 `(user, roblox)` 레코드가 있을 때의 발급 처리
    async fn reissue(
        &self,
        mut existing: LinkedProvider,
        target: &RobloxUserSummary,
    ) -> AppResult<ChallengeIssued> {
        let challenge = existing.challenge().cloned().ok_or_else(|| {
            AppError::InternalError(format!("roblox record {} has no challenge state", existing.id_str()))
        })?;

        if !challenge.is_pending() {
            return Err(AppError::ConflictError("Roblox account already linked".to_string()));
        }

        let native_id = target.id.to_string();
        if existing.provider_id == native_id {
            log::info!("대기 중인 Roblox 검증 문구 재발급: {} → {}", existing.user_id, native_id);
            return Ok(issued(&existing, &challenge));
        }

        // 다른 계정으로 바꾸면 같은 행에 새 문구를 발급합니다
        let code = self.unique_phrase().await?;
        let state = RobloxChallengeState::pending(code, target.name.clone());
        existing.provider_id = native_id;
        existing.provider_data = ProviderData::Roblox(state.clone());
        existing.updated_at = Utc::now();

        let saved = self.providers.update(&existing).await.map_err(|e| match e {
            AppError::DuplicateKey(_) => claimed_by_other_user(),
            other => other,
        })?;

        log::info!("Roblox 검증 대상 변경: {} → {}", saved.user_id, saved.provider_id);
        Ok(issued(&saved, &state))
    }

    async fn issue_new(&self, anchor: &AuthenticatedUser, target: &RobloxUserSummary) -> AppResult<ChallengeIssued> {
        let code = self.unique_phrase().await?;
        let state = RobloxChallengeState::pending(code, target.name.clone());
        let row = LinkedProvider::pending_challenge(&anchor.user_id, target.id.to_string(), state.clone(), Utc::now());

        match self.providers.insert(&row).await {
            Ok(saved) => {
                log::info!("Roblox 검증 문구 발급: {} → {}", saved.user_id, saved.provider_id);
                Ok(issued(&saved, &state))
            }
            // 동시에 들어온 발급 요청이 먼저 저장했거나, 다른 사용자가 이미 연결한 계정
            Err(AppError::DuplicateKey(index)) => {
                log::debug!("Roblox 레코드 중복 ({}), 기존 레코드로 처리", index);
                match self.providers.find_by_user_and_type(&anchor.user_id, AuthProvider::Roblox).await? {
                    Some(existing) => self.reissue(existing, target).await,
                    None => Err(claimed_by_other_user()),
                }
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl LoginFlow for RobloxProvider {
    fn provider(&self) -> AuthProvider {
        AuthProvider::Roblox
    }

    /// 검증 문구를 발급합니다 (`none → pending`).
    async fn begin_login(&self, request: &ProviderRequest) -> AppResult<LoginStart> {
        let anchor = request.require_anchor()?;
        let username = request.params.username.as_deref()
            .ok_or_else(|| AppError::ValidationError("Missing username".to_string()))?;

        let target = self.api
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let challenge = match self.providers.find_by_user_and_type(&anchor.user_id, AuthProvider::Roblox).await? {
            Some(existing) => self.reissue(existing, &target).await?,
            None => self.issue_new(anchor, &target).await?,
        };

        Ok(LoginStart::Challenge(challenge))
    }

    /// 검증 문구를 확인합니다 (`pending → verified`).
    ///
    /// 앵커 세션이 있으면 그 사용자의 레코드만 찾습니다. 남의 코드는 없는 코드와 같게 취급합니다.
    async fn complete_login(&self, request: &ProviderRequest) -> AppResult<LoginOutcome> {
        if let Some(error) = reported_error(&request.params) {
            return Err(error);
        }

        let code = request.params.code.as_deref()
            .ok_or_else(|| AppError::ValidationError("Missing code".to_string()))?;
        if !is_well_formed(code) {
            return Err(code_not_found());
        }

        let row = self.providers
            .find_by_challenge_code(code)
            .await?
            .filter(|row| row.provider_type == AuthProvider::Roblox)
            .filter(|row| request.anchor.as_ref().is_none_or(|anchor| anchor.user_id == row.user_id))
            .ok_or_else(code_not_found)?;

        let challenge = row.challenge().ok_or_else(code_not_found)?;
        if !challenge.is_pending() {
            return Err(already_verified());
        }

        let profile = self.api.get_user(&row.provider_id).await?;
        if !challenge.is_satisfied_by(&profile.description) {
            log::info!("Roblox 검증 실패 (문구 없음): {}", row.provider_id);
            return Err(AppError::ValidationError("Invalid code".to_string()));
        }

        let verified = self.providers
            .mark_challenge_verified(row.id_str(), code, Utc::now())
            .await?
            .ok_or_else(already_verified)?;

        log::info!("Roblox 검증 완료: {} → {}", verified.user_id, verified.provider_id);
        Ok(LoginOutcome::Verified(verified))
    }

    async fn logout(&self, request: &ProviderRequest) -> AppResult<LogoutOutcome> {
        let anchor = request.require_anchor()?;
        let removed = self.providers
            .delete_by_user_and_type(&anchor.user_id, AuthProvider::Roblox)
            .await?;

        log::info!("Roblox 연결 해제: {} (삭제됨: {})", anchor.user_id, removed);
        Ok(LogoutOutcome::Unlinked { removed })
    }
}
