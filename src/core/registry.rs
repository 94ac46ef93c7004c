//! # Service Registry - 명시적 서비스 조립
//!
//! 애플리케이션 시작 시 한 번 서비스 그래프를 조립하고, 결과인 [`AppServices`]를
//! `web::Data`로 모든 워커에 공유합니다.
//!
//! 전역 상태나 타입 기반 자동 주입은 사용하지 않습니다. 각 서비스는 생성자에서
//! 리포지토리와 외부 API 클라이언트를 `Arc<dyn Trait>`로 받으며, 테스트는 같은 경로로
//! 인메모리 저장소와 가짜 클라이언트를 주입합니다.
//!
//! ## 조립 순서
//!
//! ```text
//! AppConfig
//!    │
//!    ├─ Database ──────► Mongo*Repository (create_indexes)
//!    ├─ RedisClient ───► RedisOAuthStateStore
//!    └─ reqwest::Client ► DiscordClient, LastFmClient, RobloxClient, StripeClient
//!                │
//!                ▼
//!         ServiceDeps ──► AppServices::assemble
//!                          ├─ AuthService (ProviderRegistry + IdentityService + TokenService)
//!                          ├─ AccountService
//!                          ├─ WorkspaceService
//!                          ├─ BotService
//!                          └─ IntegrationService
//! ```

use std::sync::Arc;
use std::time::Duration;
use crate::caching::oauth_state::{OAuthStateStore, RedisOAuthStateStore};
use crate::caching::redis::RedisClient;
use crate::clients::{
    build_http_client, BillingApi, DiscordApi, DiscordClient, LastFmApi, LastFmClient, RobloxApi, RobloxClient,
    StripeClient,
};
use crate::config::{AppConfig, CookieConfig};
use crate::db::Database;
use crate::errors::{AppError, AppResult, ErrorContext};
use crate::repositories::{
    AccountRepository, BotRepository, IntegrationRepository, MongoAccountRepository, MongoBotRepository,
    MongoIntegrationRepository, MongoProfileRepository, MongoProviderRepository, MongoWorkspaceRepository,
    ProfileRepository, ProviderRepository, WorkspaceRepository,
};
use crate::services::accounts::AccountService;
use crate::services::auth::challenge::{PhraseSource, RandomPhrase};
use crate::services::auth::providers::{DiscordProvider, LastFmProvider, RobloxProvider};
use crate::services::auth::{AuthService, IdentityService, ProviderRegistry, TokenService};
use crate::services::workspaces::{BotService, IntegrationService, WorkspaceService};

/// 서비스가 의존하는 저장소와 외부 API
pub struct ServiceDeps {
    pub providers: Arc<dyn ProviderRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub workspaces: Arc<dyn WorkspaceRepository>,
    pub bots: Arc<dyn BotRepository>,
    pub integrations: Arc<dyn IntegrationRepository>,
    pub states: Arc<dyn OAuthStateStore>,
    pub discord: Arc<dyn DiscordApi>,
    pub lastfm: Arc<dyn LastFmApi>,
    pub roblox: Arc<dyn RobloxApi>,
    pub billing: Arc<dyn BillingApi>,
    pub phrases: Arc<dyn PhraseSource>,
}

impl ServiceDeps {
    /// MongoDB, Redis, 실제 외부 API 클라이언트로 의존성을 만듭니다.
    ///
    /// 컬렉션 인덱스도 이 시점에 생성합니다.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        log::info!("📡 데이터베이스 연결 중...");
        let database = Database::connect(&config.database)
            .await
            .map_err(|e| AppError::DatabaseError(format!("MongoDB 연결 실패: {}", e)))?;

        let providers = MongoProviderRepository::new(&database);
        let profiles = MongoProfileRepository::new(&database);
        let accounts = MongoAccountRepository::new(&database);
        let workspaces = MongoWorkspaceRepository::new(&database);
        let bots = MongoBotRepository::new(&database);
        let integrations = MongoIntegrationRepository::new(&database);

        providers.create_indexes().await?;
        profiles.create_indexes().await?;
        accounts.create_indexes().await?;
        workspaces.create_indexes().await?;
        bots.create_indexes().await?;
        integrations.create_indexes().await?;
        log::info!("✅ 컬렉션 인덱스 준비 완료");

        let redis = RedisClient::new(&config.redis)
            .await
            .map_err(|e| AppError::RedisError(format!("Redis 연결 실패: {}", e)))?;

        let http = build_http_client(&config.http).context("HTTP 클라이언트 생성 실패")?;

        Ok(Self {
            providers: Arc::new(providers),
            profiles: Arc::new(profiles),
            accounts: Arc::new(accounts),
            workspaces: Arc::new(workspaces),
            bots: Arc::new(bots),
            integrations: Arc::new(integrations),
            states: Arc::new(RedisOAuthStateStore::new(redis)),
            discord: Arc::new(DiscordClient::new(http.clone(), config.discord.clone())),
            lastfm: Arc::new(LastFmClient::new(http.clone(), config.lastfm.clone())),
            roblox: Arc::new(RobloxClient::new(http.clone(), config.roblox.clone())),
            billing: Arc::new(StripeClient::new(http, config.billing.clone())),
            phrases: Arc::new(RandomPhrase),
        })
    }
}

/// 요청 처리에 필요한 서비스 묶음
pub struct AppServices {
    pub auth: AuthService,
    pub accounts: AccountService,
    pub workspaces: WorkspaceService,
    pub bots: BotService,
    pub integrations: IntegrationService,
    pub cookies: CookieConfig,
    /// `token` 쿠키 수명 (세션 토큰 만료와 같음)
    pub session_hours: i64,
}

impl AppServices {
    pub fn assemble(config: &AppConfig, deps: ServiceDeps) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt));

        let registry = ProviderRegistry::new(
            DiscordProvider::new(
                deps.discord.clone(),
                deps.states,
                deps.providers.clone(),
                config.discord.clone(),
                &config.callback_url,
                Duration::from_secs(config.redis.oauth_state_ttl_secs),
            ),
            LastFmProvider::new(deps.lastfm, deps.providers.clone(), config.lastfm.clone(), &config.callback_url),
            RobloxProvider::new(
                deps.roblox,
                deps.providers.clone(),
                deps.phrases,
                config.roblox.challenge_length,
            ),
        );

        let identities = IdentityService::new(deps.providers.clone(), deps.profiles.clone(), deps.billing.clone());

        Self {
            auth: AuthService::new(registry, identities, tokens),
            accounts: AccountService::new(
                deps.providers,
                deps.profiles.clone(),
                deps.accounts,
                deps.workspaces.clone(),
                deps.bots.clone(),
                deps.discord.clone(),
                config.discord.cdn_base.clone(),
            ),
            bots: BotService::new(deps.bots, deps.discord),
            integrations: IntegrationService::new(deps.integrations),
            workspaces: WorkspaceService::new(deps.workspaces, deps.profiles, deps.billing, config.billing.clone()),
            cookies: config.cookie.clone(),
            session_hours: config.jwt.expiration_hours,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! 핸들러 테스트용 조립

    use std::collections::HashMap;
    use crate::caching::oauth_state::InMemoryOAuthStateStore;
    use crate::clients::fakes::{FakeBilling, FakeDiscord, FakeLastFm, FakeRoblox};
    use crate::repositories::memory::{
        InMemoryAccountRepository, InMemoryBotRepository, InMemoryIntegrationRepository, InMemoryProfileRepository,
        InMemoryProviderRepository, InMemoryWorkspaceRepository,
    };
    use crate::services::auth::challenge::testing::FixedPhrases;
    use super::*;

    pub fn test_config() -> AppConfig {
        let source: HashMap<String, String> = [
            ("ENVIRONMENT", "test"),
            ("JWT_SECRET", "test-secret"),
            ("CALLBACK_URL", "https://api.astralapp.io/api/v1/auth/callback/{provider}"),
            ("DISCORD_CLIENT_ID", "client-id"),
            ("DISCORD_CLIENT_SECRET", "client-secret"),
            ("LASTFM_KEY", "lastfm-key"),
            ("LASTFM_SECRET", "lastfm-secret"),
            ("STRIPE_SECRET_KEY", "sk_test"),
            ("STRIPE_PRICE_STARTER", "price_starter"),
            ("STRIPE_PRICE_PRO", "price_pro"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        AppConfig::from_source(&source).expect("test config")
    }

    /// 테스트에서 상태를 확인하거나 시드할 수 있는 핸들
    pub struct TestApp {
        pub services: AppServices,
        pub providers: Arc<InMemoryProviderRepository>,
        pub profiles: Arc<InMemoryProfileRepository>,
        pub accounts: Arc<InMemoryAccountRepository>,
        pub workspaces: Arc<InMemoryWorkspaceRepository>,
        pub bots: Arc<InMemoryBotRepository>,
        pub integrations: Arc<InMemoryIntegrationRepository>,
        pub roblox: Arc<FakeRoblox>,
        pub billing: Arc<FakeBilling>,
    }

    pub fn test_services(discord: FakeDiscord, lastfm: FakeLastFm, roblox: FakeRoblox, phrases: &[&str]) -> TestApp {
        let providers = Arc::new(InMemoryProviderRepository::new());
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let workspaces = Arc::new(InMemoryWorkspaceRepository::new());
        let bots = Arc::new(InMemoryBotRepository::new());
        let integrations = Arc::new(InMemoryIntegrationRepository::new());
        let roblox = Arc::new(roblox);
        let billing = Arc::new(FakeBilling::default());

        let deps = ServiceDeps {
            providers: providers.clone(),
            profiles: profiles.clone(),
            accounts: accounts.clone(),
            workspaces: workspaces.clone(),
            bots: bots.clone(),
            integrations: integrations.clone(),
            states: Arc::new(InMemoryOAuthStateStore::new()),
            discord: Arc::new(discord),
            lastfm: Arc::new(lastfm),
            roblox: roblox.clone(),
            billing: billing.clone(),
            phrases: Arc::new(FixedPhrases::new(phrases)),
        };

        TestApp {
            services: AppServices::assemble(&test_config(), deps),
            providers,
            profiles,
            accounts,
            workspaces,
            bots,
            integrations,
            roblox,
            billing,
        }
    }
}
