//! # 아이덴티티 조정(reconciliation) 서비스
//!
//! 프로바이더 인증이 끝난 아이덴티티를 받아, 연결 레코드를 새로 만들지 기존 레코드를 갱신할지 결정합니다.
//! 인증 중 `LinkedProvider`와 `Profile`을 쓰는 곳은 이 서비스뿐입니다.
//!
//! ## 결정 규칙
//!
//! ```text
//! (type, native_id) 레코드 존재?
//!   ├─ 예  ├─ 앵커 아님 + 소유자의 앵커 세션 아님 → AuthenticationError / ConflictError
//!   │      └─ 갱신: 토큰/만료/부가 데이터/아바타/이메일, 앵커면 프로필도 갱신
//!   └─ 아니오
//!        ├─ 앵커 아님 + 앵커 세션 없음 → AuthenticationError
//!        ├─ 앵커 아님 + (user, type) 레코드 존재 → 그 행을 새 계정으로 교체 (갱신)
//!        └─ 삽입. 앵커면 결제 고객 생성 → 프로필 삽입
//! ```
//!
//! ## 동시성
//!
//! "존재 확인 후 삽입"은 저장소의 유니크 인덱스로 하나의 단위가 됩니다.
//! 삽입이 `DuplicateKey`로 실패하면 먼저 들어온 요청이 만든 레코드를 다시 읽어 갱신으로 처리합니다.
//!
//! ## 보상 처리
//!
//! 앵커 최초 연결에서 결제 고객 생성이나 프로필 삽입이 실패하면 방금 넣은 연결 레코드를 지우고
//! 원래 에러를 돌려줍니다. 이미 만들어진 결제 고객은 되돌리지 않고 로그로 남깁니다.

use std::sync::Arc;
use chrono::Utc;
use crate::clients::BillingApi;
use crate::domain::dto::auth::ReconcileAction;
use crate::domain::entities::profiles::Profile;
use crate::domain::entities::providers::LinkedProvider;
use crate::domain::models::auth::AuthenticatedUser;
use crate::domain::models::identity::ProviderIdentity;
use crate::errors::{AppError, AppResult};
use crate::repositories::{ProfileRepository, ProviderRepository};

/// 조정 결과
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub action: ReconcileAction,
    pub provider: LinkedProvider,
}

pub struct IdentityService {
    providers: Arc<dyn ProviderRepository>,
    profiles: Arc<dyn ProfileRepository>,
    billing: Arc<dyn BillingApi>,
}

impl IdentityService {
    /// # Arguments
    ///
    /// * `billing` - 최초 앵커 연결 시 결제 고객을 만들 클라이언트
    pub fn new(
        providers: Arc<dyn ProviderRepository>,
        profiles: Arc<dyn ProfileRepository>,
        billing: Arc<dyn BillingApi>,
    ) -> Self {
        Self { providers, profiles, billing }
    }

    /// 완료된 프로바이더 인증을 저장소에 반영합니다.
    ///
    /// # Arguments
    ///
    /// * `identity` - 어댑터가 정규화한 아이덴티티
    /// * `anchor` - 현재 세션의 앵커 사용자 (비앵커 프로바이더는 연결과 갱신 모두 필요)
    ///
    /// # Returns
    ///
    /// 생성/갱신 여부와 저장된 연결 레코드
    ///
    /// # Errors
    ///
    /// * `AuthenticationError` - 비앵커 프로바이더인데 앵커 세션이 없음
    /// * `ConflictError` - 이 외부 계정이 다른 사용자에게 연결되어 있음
    /// * 저장소/결제 호출 실패
    pub async fn reconcile(
        &self,
        identity: &ProviderIdentity,
        anchor: Option<&AuthenticatedUser>,
    ) -> AppResult<Reconciled> {
        let provider = identity.provider();

        if let Some(existing) = self.providers.find_by_native_id(provider, &identity.native_id).await? {
            return self.refresh(existing, identity, anchor).await;
        }

        let user_id = if provider.is_anchor() {
            uuid::Uuid::new_v4().to_string()
        } else {
            let anchor = anchor.ok_or_else(|| {
                log::warn!("{} 연결 시도에 앵커 세션 없음", provider);
                AppError::AuthenticationError("anchor identity required".to_string())
            })?;

            // 같은 종류의 다른 계정이 이미 연결되어 있으면 그 행을 교체합니다
            if let Some(mut current) = self.providers.find_by_user_and_type(&anchor.user_id, provider).await? {
                log::info!("{} 연결 교체: {} ({} → {})", provider, anchor.user_id, current.provider_id, identity.native_id);
                current.provider_id = identity.native_id.clone();
                current.refresh_from(identity, Utc::now());
                let saved = self.providers.update(&current).await?;
                return Ok(Reconciled { action: ReconcileAction::Updated, provider: saved });
            }

            anchor.user_id.clone()
        };

        let candidate = LinkedProvider::from_identity(user_id, identity, Utc::now());
        let inserted = match self.providers.insert(&candidate).await {
            Ok(inserted) => inserted,
            Err(AppError::DuplicateKey(index)) => {
                log::info!("{} 레코드 동시 생성 감지 ({}), 갱신으로 처리", provider, index);
                let existing = self.providers
                    .find_by_native_id(provider, &identity.native_id)
                    .await?
                    .ok_or_else(|| AppError::ConflictError(format!("{} account is already linked", provider)))?;
                return self.refresh(existing, identity, anchor).await;
            }
            Err(e) => return Err(e),
        };

        if provider.is_anchor() {
            self.create_profile(&inserted, identity).await?;
        }

        log::info!("{} 연결 생성: {} → {}", provider, inserted.user_id, inserted.provider_id);
        Ok(Reconciled { action: ReconcileAction::Created, provider: inserted })
    }

    async fn refresh(
        &self,
        mut existing: LinkedProvider,
        identity: &ProviderIdentity,
        anchor: Option<&AuthenticatedUser>,
    ) -> AppResult<Reconciled> {
        let provider = existing.provider_type;

        if !provider.is_anchor() {
            // 비앵커 레코드는 소유자의 앵커 세션으로만 갱신됩니다
            let anchor = anchor.ok_or_else(|| {
                log::warn!("{} 갱신 시도에 앵커 세션 없음: {}", provider, existing.provider_id);
                AppError::AuthenticationError("anchor identity required".to_string())
            })?;
            if anchor.user_id != existing.user_id {
                log::warn!("{} 계정 {}은 다른 사용자에게 연결됨 (요청: {})", provider, existing.provider_id, anchor.user_id);
                return Err(AppError::ConflictError(format!(
                    "This {} account is already linked to another user",
                    provider
                )));
            }
        }

        existing.refresh_from(identity, Utc::now());
        let saved = self.providers.update(&existing).await?;

        if provider.is_anchor() {
            match self.profiles.find_by_id(&saved.user_id).await? {
                Some(mut profile) => {
                    profile.mirror_anchor(identity, Utc::now());
                    self.profiles.update(&profile).await?;
                }
                None => {
                    // 이전 생성이 중간에 실패해 프로필이 없는 경우
                    log::warn!("프로필 없는 앵커 레코드 발견, 프로필 재생성: {}", saved.user_id);
                    self.insert_profile(&saved, identity).await?;
                }
            }
        }

        log::info!("{} 연결 갱신: {} → {}", provider, saved.user_id, saved.provider_id);
        Ok(Reconciled { action: ReconcileAction::Updated, provider: saved })
    }

    /// 최초 앵커 연결의 프로필 생성. 실패하면 연결 레코드를 지웁니다.
    async fn create_profile(&self, inserted: &LinkedProvider, identity: &ProviderIdentity) -> AppResult<Profile> {
        match self.insert_profile(inserted, identity).await {
            Ok(profile) => Ok(profile),
            Err(e) => {
                log::error!("프로필 생성 실패, 연결 레코드 롤백 ({}): {}", inserted.user_id, e);
                if let Err(rollback) = self.providers.delete(inserted.id_str()).await {
                    log::error!("연결 레코드 롤백 실패 ({}): {}", inserted.id_str(), rollback);
                }
                Err(e)
            }
        }
    }

    async fn insert_profile(&self, linked: &LinkedProvider, identity: &ProviderIdentity) -> AppResult<Profile> {
        let customer = self.billing
            .create_customer(identity.email.as_deref(), &identity.display_name, &linked.user_id)
            .await?;

        let profile = Profile::from_anchor(&linked.user_id, identity, Some(customer.id.clone()), Utc::now());
        self.profiles.insert(&profile).await.inspect_err(|_| {
            log::warn!("프로필 삽입 실패, 결제 고객 {}은 남아 있음", customer.id);
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::clients::fakes::{FakeBilling, FakeDiscord};
    use crate::config::AuthProvider;
    use crate::domain::models::providers::LastFmSession;
    use crate::repositories::memory::{InMemoryProfileRepository, InMemoryProviderRepository};
    use crate::services::auth::providers::testing::anchor;
    use super::*;

    struct Harness {
        providers: Arc<InMemoryProviderRepository>,
        profiles: Arc<InMemoryProfileRepository>,
        billing: Arc<FakeBilling>,
        service: IdentityService,
    }

    fn harness(billing: FakeBilling) -> Harness {
        let providers = Arc::new(InMemoryProviderRepository::new());
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let billing = Arc::new(billing);
        let service = IdentityService::new(providers.clone(), profiles.clone(), billing.clone());
        Harness { providers, profiles, billing, service }
    }

    fn discord_identity(id: &str, name: &str) -> ProviderIdentity {
        FakeDiscord::user(id, name).into_identity(None, "https://cdn.discordapp.com", Utc::now())
    }

    fn lastfm_identity(name: &str) -> ProviderIdentity {
        LastFmSession { name: name.into(), key: format!("sk-{}", name), subscriber: 0 }.into_identity()
    }

    #[actix_web::test]
    async fn test_first_anchor_link_creates_profile() {
        let h = harness(FakeBilling::default());

        let result = h.service.reconcile(&discord_identity("d-1", "nelly"), None).await.unwrap();

        assert_eq!(result.action, ReconcileAction::Created);
        let profile = h.profiles.find_by_id(&result.provider.user_id).await.unwrap().unwrap();
        assert_eq!(profile.discord_id, "d-1");
        assert_eq!(profile.preferred_name, "nelly");
        assert_eq!(profile.stripe_customer_id, Some(format!("cus_{}", result.provider.user_id)));
    }

    #[actix_web::test]
    async fn test_second_callback_updates_in_place() {
        let h = harness(FakeBilling::default());
        let first = h.service.reconcile(&discord_identity("d-1", "nelly"), None).await.unwrap();

        let mut renamed = discord_identity("d-1", "nelly2");
        renamed.access_token = Some("rotated".into());
        let second = h.service.reconcile(&renamed, None).await.unwrap();

        assert_eq!(second.action, ReconcileAction::Updated);
        assert_eq!(second.provider.id, first.provider.id);
        assert_eq!(second.provider.provider_access_token.as_deref(), Some("rotated"));
        assert_eq!(h.providers.len(), 1);
        assert_eq!(h.profiles.len(), 1);
        let profile = h.profiles.find_by_id(&first.provider.user_id).await.unwrap().unwrap();
        assert_eq!(profile.preferred_name, "nelly2");
        assert_eq!(h.billing.customers.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_non_anchor_requires_anchor_session() {
        let h = harness(FakeBilling::default());

        assert_eq!(
            h.service.reconcile(&lastfm_identity("rj"), None).await.unwrap_err(),
            AppError::AuthenticationError("anchor identity required".into())
        );
        assert!(h.providers.is_empty());

        let user = anchor("user-1");
        let result = h.service.reconcile(&lastfm_identity("rj"), Some(&user)).await.unwrap();
        assert_eq!(result.action, ReconcileAction::Created);
        assert_eq!(result.provider.user_id, "user-1");
        assert!(h.profiles.is_empty());
    }

    #[actix_web::test]
    async fn test_relinking_other_account_replaces_row() {
        let h = harness(FakeBilling::default());
        let user = anchor("user-1");
        h.service.reconcile(&lastfm_identity("rj"), Some(&user)).await.unwrap();

        let result = h.service.reconcile(&lastfm_identity("rj-alt"), Some(&user)).await.unwrap();

        assert_eq!(result.action, ReconcileAction::Updated);
        assert_eq!(result.provider.provider_id, "rj-alt");
        assert_eq!(h.providers.len(), 1);
    }

    #[actix_web::test]
    async fn test_account_linked_to_other_user_conflicts() {
        let h = harness(FakeBilling::default());
        h.service.reconcile(&lastfm_identity("rj"), Some(&anchor("user-1"))).await.unwrap();

        let err = h.service.reconcile(&lastfm_identity("rj"), Some(&anchor("user-2"))).await.unwrap_err();
        assert!(matches!(err, AppError::ConflictError(_)));
    }

    #[actix_web::test]
    async fn test_existing_non_anchor_row_needs_owner_session() {
        let h = harness(FakeBilling::default());
        let linked = h.service.reconcile(&lastfm_identity("rj"), Some(&anchor("user-1"))).await.unwrap();

        let mut rotated = lastfm_identity("rj");
        rotated.access_token = Some("sk-rotated".into());
        assert_eq!(
            h.service.reconcile(&rotated, None).await.unwrap_err(),
            AppError::AuthenticationError("anchor identity required".into())
        );

        let stored = h.providers.find_by_native_id(AuthProvider::LastFm, "rj").await.unwrap().unwrap();
        assert_eq!(stored, linked.provider);

        let refreshed = h.service.reconcile(&rotated, Some(&anchor("user-1"))).await.unwrap();
        assert_eq!(refreshed.action, ReconcileAction::Updated);
        assert_eq!(refreshed.provider.provider_access_token.as_deref(), Some("sk-rotated"));
    }

    #[actix_web::test]
    async fn test_billing_failure_rolls_back_provider_row() {
        let h = harness(FakeBilling { fail_customers: true, ..Default::default() });

        let err = h.service.reconcile(&discord_identity("d-1", "nelly"), None).await.unwrap_err();

        assert!(matches!(err, AppError::ExternalServiceError(_)));
        assert!(h.providers.is_empty());
        assert!(h.profiles.is_empty());
    }

    /// 존재 확인과 삽입 사이에 다른 요청이 끼어든 상황을 재현하는 저장소
    struct RacingProviders {
        inner: InMemoryProviderRepository,
        raced: LinkedProvider,
    }

    #[async_trait::async_trait]
    impl ProviderRepository for RacingProviders {
        async fn find_by_native_id(&self, provider: AuthProvider, native_id: &str) -> AppResult<Option<LinkedProvider>> {
            let found = self.inner.find_by_native_id(provider, native_id).await?;
            if found.is_none() {
                // 첫 조회 직후 경쟁 요청이 같은 레코드를 저장
                self.inner.insert(&self.raced).await?;
            }
            Ok(found)
        }
        async fn find_by_user_and_type(&self, user_id: &str, provider: AuthProvider) -> AppResult<Option<LinkedProvider>> {
            self.inner.find_by_user_and_type(user_id, provider).await
        }
        async fn find_by_challenge_code(&self, code: &str) -> AppResult<Option<LinkedProvider>> {
            self.inner.find_by_challenge_code(code).await
        }
        async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<LinkedProvider>> {
            self.inner.list_by_user(user_id).await
        }
        async fn insert(&self, provider: &LinkedProvider) -> AppResult<LinkedProvider> {
            self.inner.insert(provider).await
        }
        async fn update(&self, provider: &LinkedProvider) -> AppResult<LinkedProvider> {
            self.inner.update(provider).await
        }
        async fn mark_challenge_verified(&self, id: &str, code: &str, now: chrono::DateTime<Utc>) -> AppResult<Option<LinkedProvider>> {
            self.inner.mark_challenge_verified(id, code, now).await
        }
        async fn delete(&self, id: &str) -> AppResult<bool> {
            self.inner.delete(id).await
        }
        async fn delete_by_user_and_type(&self, user_id: &str, provider: AuthProvider) -> AppResult<bool> {
            self.inner.delete_by_user_and_type(user_id, provider).await
        }
        async fn delete_by_user(&self, user_id: &str) -> AppResult<u64> {
            self.inner.delete_by_user(user_id).await
        }
    }

    #[actix_web::test]
    async fn test_duplicate_insert_is_treated_as_update() {
        let providers = Arc::new(RacingProviders {
            inner: InMemoryProviderRepository::new(),
            raced: LinkedProvider::from_identity("user-9", &discord_identity("d-1", "nelly"), Utc::now()),
        });
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let service = IdentityService::new(providers.clone(), profiles.clone(), Arc::new(FakeBilling::default()));

        let result = service.reconcile(&discord_identity("d-1", "nelly"), None).await.unwrap();

        assert_eq!(result.action, ReconcileAction::Updated);
        assert_eq!(result.provider.id, providers.raced.id);
        assert_eq!(providers.inner.len(), 1);
        // 경쟁 요청이 프로필을 만들기 전이었다면 갱신 경로에서 만들어 둡니다
        assert!(profiles.find_by_id("user-9").await.unwrap().is_some());
    }
}
