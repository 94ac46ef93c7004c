//! 세션 토큰 관리 서비스 구현
//!
//! 연결된 프로바이더 레코드를 `UserInfo` 클레임으로 담은 HS256 JWT를 발급하고 검증합니다.
//! 서명 키는 생성자에서 [`JwtConfig`]로 한 번 전달받으며, 호출 시점에 환경 변수를 읽지 않습니다.
//!
//! 서버 측에 저장되는 세션은 없습니다. 유효성은 서명과 만료 시각으로만 판단합니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use crate::config::JwtConfig;
use crate::domain::entities::providers::LinkedProvider;
use crate::domain::models::token::SessionClaims;
use crate::errors::AppError;

/// 토큰 발급/검증 에러
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("failed to sign session token: {0}")]
    SigningFailure(String),

    /// 서명 불일치 또는 허용되지 않은 알고리즘
    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("malformed token")]
    Malformed,
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::SigningFailure(e) => AppError::InternalError(format!("토큰 생성 실패: {}", e)),
            TokenError::Expired => AppError::AuthenticationError("Session expired".to_string()),
            TokenError::InvalidSignature | TokenError::Malformed => {
                AppError::AuthenticationError("Invalid session token".to_string())
            }
        }
    }
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    /// 서명 키와 토큰 수명으로 서비스를 만듭니다.
    ///
    /// # Arguments
    ///
    /// * `config` - `JWT_SECRET`, `JWT_EXPIRATION_HOURS`에서 읽은 설정
    ///
    /// 만료 판정에 여유 시간(leeway)을 두지 않습니다.
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            lifetime: Duration::hours(config.expiration_hours),
        }
    }

    /// 세션 토큰을 발급합니다. 만료 시각은 발급 시각 + 설정된 수명(기본 24시간)입니다.
    ///
    /// # Arguments
    ///
    /// * `subject` - 앵커 프로바이더의 네이티브 ID (`sub` 클레임)
    /// * `linked` - `UserInfo` 클레임에 담을 연결 레코드
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - HS256으로 서명된 JWT
    ///
    /// # Errors
    ///
    /// * `TokenError::SigningFailure` - 클레임 직렬화 또는 서명 실패
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let tokens = TokenService::new(&config.jwt);
    /// let token = tokens.issue(&identity.native_id, &linked)?;
    /// ```
    pub fn issue(&self, subject: &str, linked: &LinkedProvider) -> Result<String, TokenError> {
        self.issue_at(subject, linked, Utc::now())
    }

    /// 발급 시각을 지정해 토큰을 만듭니다. 만료 경계 테스트에 씁니다.
    ///
    /// # Errors
    ///
    /// * `TokenError::SigningFailure` - 서명 실패
    pub fn issue_at(&self, subject: &str, linked: &LinkedProvider, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = SessionClaims {
            user_info: linked.clone(),
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailure(e.to_string()))
    }

    /// 서명과 만료를 검증하고 클레임을 반환합니다.
    ///
    /// HS256 이외의 알고리즘으로 서명된 토큰은 서명이 맞더라도 거부됩니다.
    ///
    /// # Arguments
    ///
    /// * `token` - 쿠키나 `Authorization: Bearer` 헤더에서 꺼낸 토큰
    ///
    /// # Returns
    ///
    /// * `Ok(SessionClaims)` - `UserInfo`, `sub`, `iat`, `exp`
    ///
    /// # Errors
    ///
    /// * `TokenError::Expired` - `exp`가 지남
    /// * `TokenError::InvalidSignature` - 다른 키 또는 다른 알고리즘으로 서명됨
    /// * `TokenError::Malformed` - JWT 형식이 아니거나 클레임을 해석할 수 없음
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}

/// `Authorization` 헤더 값에서 Bearer 토큰을 꺼냅니다.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::providers::{ProviderData, DiscordIdentityData};

    fn config(secret: &str) -> JwtConfig {
        JwtConfig { secret: secret.to_string(), expiration_hours: 24 }
    }

    fn linked() -> LinkedProvider {
        let now = Utc::now();
        LinkedProvider {
            id: Some("lp-1".to_string()),
            user_id: "user-1".to_string(),
            provider_type: crate::config::AuthProvider::Discord,
            provider_id: "80351110224678912".to_string(),
            provider_access_token: Some("access".to_string()),
            provider_refresh_token: None,
            provider_expires_at: None,
            provider_data: ProviderData::Discord(DiscordIdentityData {
                username: "nelly".to_string(),
                ..Default::default()
            }),
            provider_avatar_url: None,
            provider_email: Some("nelly@discord.com".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_then_verify_returns_same_claims() {
        let service = TokenService::new(&config("secret"));
        let lp = linked();

        let token = service.issue("80351110224678912", &lp).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, "80351110224678912");
        assert_eq!(claims.user_info, lp);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_expired_after_lifetime() {
        let service = TokenService::new(&config("secret"));
        let issued = Utc::now() - Duration::hours(24) - Duration::seconds(1);

        let token = service.issue_at("sub", &linked(), issued).unwrap();
        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_still_valid_just_before_expiry() {
        let service = TokenService::new(&config("secret"));
        let issued = Utc::now() - Duration::hours(23);

        let token = service.issue_at("sub", &linked(), issued).unwrap();
        assert!(service.verify(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new(&config("secret")).issue("sub", &linked()).unwrap();
        let other = TokenService::new(&config("another-secret"));

        assert_eq!(other.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let claims = SessionClaims {
            user_info: linked(),
            sub: "sub".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let service = TokenService::new(&config("secret"));
        assert_eq!(service.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let service = TokenService::new(&config("secret"));
        assert_eq!(service.verify("not-a-jwt"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
