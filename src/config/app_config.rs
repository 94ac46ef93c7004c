//! 서버, 외부 HTTP 호출, 결제, Rate Limiting 설정과 전체 설정 묶음

use super::{
    CallbackUrlTemplate, ConfigError, ConfigSource, CookieConfig, DatabaseConfig,
    DiscordOAuthConfig, EnvSource, Environment, JwtConfig, LastFmConfig, RedisConfig,
    RobloxConfig,
};

/// HTTP 서버 바인딩 설정
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            host: source.get_or("HOST", "127.0.0.1"),
            port: source.parse_or("PORT", 8080)?,
            workers: source.parse_or("WORKERS", 4)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 외부 API 호출 설정
///
/// 모든 프로바이더/결제 호출은 이 타임아웃을 공유합니다.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout_secs: u64,
}

impl HttpClientConfig {
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            timeout_secs: source.parse_or("HTTP_TIMEOUT_SECS", 10)?,
        })
    }
}

/// 결제 프로바이더(Stripe) 설정
#[derive(Debug, Clone)]
pub struct BillingConfig {
    pub secret_key: String,
    pub api_base: String,
    pub starter_price_id: String,
    pub pro_price_id: String,
}

impl BillingConfig {
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            secret_key: source.require("STRIPE_SECRET_KEY")?,
            api_base: source.get_or("STRIPE_API_BASE", "https://api.stripe.com/v1"),
            starter_price_id: source.get_or("STRIPE_PRICE_STARTER", ""),
            pro_price_id: source.get_or("STRIPE_PRICE_PRO", ""),
        })
    }
}

/// Rate Limiting 설정
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitConfig {
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            per_second: source.parse_or("RATE_LIMIT_PER_SECOND", 100)?,
            burst_size: source.parse_or("RATE_LIMIT_BURST_SIZE", 200)?,
        })
    }
}

/// 시작 시 한 번 로드되는 전체 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub callback_url: CallbackUrlTemplate,
    pub discord: DiscordOAuthConfig,
    pub lastfm: LastFmConfig,
    pub roblox: RobloxConfig,
    pub billing: BillingConfig,
    pub http: HttpClientConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// 프로세스 환경 변수에서 전체 설정을 읽습니다.
    ///
    /// # Errors
    ///
    /// * `ConfigError::Missing` - 필수 값(프로바이더 자격 증명, 결제 키 등) 누락
    /// * `ConfigError::Invalid` - 숫자 값 파싱 실패 또는 허용되지 않는 검증 문구 길이
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&EnvSource)
    }

    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let environment = Environment::from_source(source);

        Ok(Self {
            server: ServerConfig::from_source(source)?,
            database: DatabaseConfig::from_source(source)?,
            redis: RedisConfig::from_source(source)?,
            jwt: JwtConfig::from_source(source, &environment)?,
            cookie: CookieConfig::from_source(source, &environment),
            callback_url: CallbackUrlTemplate::from_source(source),
            discord: DiscordOAuthConfig::from_source(source)?,
            lastfm: LastFmConfig::from_source(source)?,
            roblox: RobloxConfig::from_source(source)?,
            billing: BillingConfig::from_source(source)?,
            http: HttpClientConfig::from_source(source)?,
            rate_limit: RateLimitConfig::from_source(source)?,
            environment,
        })
    }
}
