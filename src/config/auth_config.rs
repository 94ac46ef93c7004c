//! # Authentication Configuration Module
//!
//! 프로바이더 종류, 세션 토큰(JWT), 쿠키, 그리고 각 아이덴티티 프로바이더의
//! 접속 정보를 관리하는 모듈입니다.
//!
//! ## 지원하는 프로바이더
//!
//! | 프로바이더 | 방식 | 앵커 여부 |
//! |-----------|------|----------|
//! | Discord | OAuth 2.0 동의 화면 | 앵커 (프로필 생성) |
//! | LastFM | 세션 키 교환 | 앵커 필요 |
//! | Roblox | 프로필 설명 검증 코드 | 앵커 필요 |
//!
//! ## 필수 환경 변수 설정
//!
//! ```bash
//! export JWT_SECRET="your-super-secret-jwt-key"
//! export DISCORD_CLIENT_ID="your-discord-client-id"
//! export DISCORD_CLIENT_SECRET="your-discord-client-secret"
//! export LASTFM_KEY="your-lastfm-api-key"
//! export LASTFM_SECRET="your-lastfm-shared-secret"
//! ```

use serde::{Deserialize, Serialize};
use super::{ConfigError, ConfigSource, Environment};

/// 세션 토큰 서명 설정
///
/// 서명 비밀키는 시작 시 한 번만 읽혀 `TokenService` 생성자로 전달됩니다.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

impl JwtConfig {
    pub fn from_source(source: &impl ConfigSource, env: &Environment) -> Result<Self, ConfigError> {
        let secret = match source.require("JWT_SECRET") {
            Ok(secret) => secret,
            Err(e) if env.is_production() => return Err(e),
            Err(_) => {
                log::warn!("JWT_SECRET not set, using default (not secure for production!)");
                "development-secret-key".to_string()
            }
        };

        Ok(Self {
            secret,
            expiration_hours: source.parse_or("JWT_EXPIRATION_HOURS", 24)?,
        })
    }
}

/// 세션 쿠키 설정
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub domain: String,
    pub secure: bool,
}

impl CookieConfig {
    /// 세션 토큰 쿠키 이름
    pub const TOKEN: &'static str = "token";
    /// 로그인 후 돌아갈 주소를 담는 쿠키 이름
    pub const REDIRECT: &'static str = "redirect";

    pub fn from_source(source: &impl ConfigSource, env: &Environment) -> Self {
        let default_domain = if env.is_production() { "astralapp.io" } else { "localhost" };
        Self {
            domain: source.get_or("COOKIE_DOMAIN", default_domain),
            secure: env.is_production(),
        }
    }
}

/// 프로바이더 콜백 URL 템플릿
///
/// `{provider}` 자리표시자가 프로바이더 이름으로 치환됩니다.
#[derive(Debug, Clone)]
pub struct CallbackUrlTemplate(String);

impl CallbackUrlTemplate {
    pub const PLACEHOLDER: &'static str = "{provider}";

    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn from_source(source: &impl ConfigSource) -> Self {
        Self::new(source.get_or(
            "CALLBACK_URL",
            "http://localhost:8080/api/v1/auth/callback/{provider}",
        ))
    }

    pub fn render(&self, provider: AuthProvider) -> String {
        self.0.replace(Self::PLACEHOLDER, provider.as_str())
    }
}

/// Discord OAuth 2.0 설정
#[derive(Debug, Clone)]
pub struct DiscordOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub api_base: String,
    pub cdn_base: String,
    pub scopes: Vec<String>,
}

impl DiscordOAuthConfig {
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: source.require("DISCORD_CLIENT_ID")?,
            client_secret: source.require("DISCORD_CLIENT_SECRET")?,
            authorize_url: source.get_or("DISCORD_AUTHORIZE_URL", "https://discord.com/oauth2/authorize"),
            api_base: source.get_or("DISCORD_API_BASE", "https://discord.com/api/v9"),
            cdn_base: source.get_or("DISCORD_CDN_BASE", "https://cdn.discordapp.com"),
            scopes: vec!["identify".into(), "email".into(), "guilds".into()],
        })
    }
}

/// LastFM 웹 인증 설정
#[derive(Debug, Clone)]
pub struct LastFmConfig {
    pub api_key: String,
    pub shared_secret: String,
    pub auth_url: String,
    pub api_base: String,
}

impl LastFmConfig {
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: source.require("LASTFM_KEY")?,
            shared_secret: source.require("LASTFM_SECRET")?,
            auth_url: source.get_or("LASTFM_AUTH_URL", "https://www.last.fm/api/auth/"),
            api_base: source.get_or("LASTFM_API_BASE", "https://ws.audioscrobbler.com/2.0/"),
        })
    }
}

/// 검증 문구 단어 수
///
/// 배포 단위로 고정되며 5 또는 8만 허용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeLength {
    Five,
    Eight,
}

impl ChallengeLength {
    pub fn words(self) -> usize {
        match self {
            ChallengeLength::Five => 5,
            ChallengeLength::Eight => 8,
        }
    }

    pub fn from_words(words: usize) -> Option<Self> {
        match words {
            5 => Some(ChallengeLength::Five),
            8 => Some(ChallengeLength::Eight),
            _ => None,
        }
    }
}

impl Default for ChallengeLength {
    fn default() -> Self {
        ChallengeLength::Five
    }
}

/// Roblox 공개 API 및 검증 설정
#[derive(Debug, Clone)]
pub struct RobloxConfig {
    pub users_api_base: String,
    pub challenge_length: ChallengeLength,
}

impl RobloxConfig {
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let words: usize = source.parse_or("ROBLOX_CHALLENGE_WORDS", 5)?;
        let challenge_length = ChallengeLength::from_words(words).ok_or_else(|| ConfigError::Invalid {
            key: "ROBLOX_CHALLENGE_WORDS".to_string(),
            value: words.to_string(),
        })?;

        Ok(Self {
            users_api_base: source.get_or("ROBLOX_USERS_API_BASE", "https://users.roblox.com"),
            challenge_length,
        })
    }
}

/// 지원하는 아이덴티티 프로바이더
///
/// 라우트 경로 파라미터(`/auth/login/{provider}`)와 저장소의 `type` 컬럼 값으로 사용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// 앵커 프로바이더. 최초 연결 시 프로필이 생성됩니다.
    Discord,

    LastFm,

    Roblox,
}

impl AuthProvider {
    pub const ALL: [AuthProvider; 3] = [AuthProvider::Discord, AuthProvider::LastFm, AuthProvider::Roblox];

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "discord" => Ok(AuthProvider::Discord),
            "lastfm" => Ok(AuthProvider::LastFm),
            "roblox" => Ok(AuthProvider::Roblox),
            _ => Err(format!("Unsupported auth provider: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Discord => "discord",
            AuthProvider::LastFm => "lastfm",
            AuthProvider::Roblox => "roblox",
        }
    }

    /// 이 프로바이더의 최초 연결이 사용자 프로필을 만드는지 여부
    pub fn is_anchor(&self) -> bool {
        matches!(self, AuthProvider::Discord)
    }
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_auth_provider_from_string() {
        assert_eq!(AuthProvider::from_str("discord").unwrap(), AuthProvider::Discord);
        assert_eq!(AuthProvider::from_str("lastfm").unwrap(), AuthProvider::LastFm);
        assert_eq!(AuthProvider::from_str("roblox").unwrap(), AuthProvider::Roblox);

        // 대소문자 무관 테스트
        assert_eq!(AuthProvider::from_str("LastFM").unwrap(), AuthProvider::LastFm);

        assert!(AuthProvider::from_str("google").is_err());
    }

    #[test]
    fn test_auth_provider_roundtrip() {
        for provider in AuthProvider::ALL {
            assert_eq!(AuthProvider::from_str(provider.as_str()).unwrap(), provider);
        }
    }

    #[test]
    fn test_auth_provider_serialization() {
        let json = serde_json::to_string(&AuthProvider::LastFm).unwrap();
        assert_eq!(json, "\"lastfm\"");
        let deserialized: AuthProvider = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, AuthProvider::LastFm);
    }

    #[test]
    fn test_only_discord_is_anchor() {
        assert!(AuthProvider::Discord.is_anchor());
        assert!(!AuthProvider::LastFm.is_anchor());
        assert!(!AuthProvider::Roblox.is_anchor());
    }

    #[test]
    fn test_callback_template_render() {
        let template = CallbackUrlTemplate::new("https://api.example.com/auth/callback/{provider}");
        assert_eq!(
            template.render(AuthProvider::Roblox),
            "https://api.example.com/auth/callback/roblox"
        );
    }

    #[test]
    fn test_challenge_length_accepts_five_or_eight() {
        assert_eq!(RobloxConfig::from_source(&source(&[])).unwrap().challenge_length.words(), 5);
        assert_eq!(
            RobloxConfig::from_source(&source(&[("ROBLOX_CHALLENGE_WORDS", "8")]))
                .unwrap()
                .challenge_length,
            ChallengeLength::Eight
        );
        assert!(RobloxConfig::from_source(&source(&[("ROBLOX_CHALLENGE_WORDS", "6")])).is_err());
    }

    #[test]
    fn test_jwt_secret_required_in_production() {
        let empty = source(&[]);
        assert!(JwtConfig::from_source(&empty, &Environment::Production).is_err());

        let dev = JwtConfig::from_source(&empty, &Environment::Development).unwrap();
        assert_eq!(dev.expiration_hours, 24);
    }
}
