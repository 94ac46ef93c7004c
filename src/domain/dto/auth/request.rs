//! 인증 요청관련 DTO
//!
//! 로그인 시작, 콜백, 로그아웃 요청의 쿼리/폼 파라미터를 매핑합니다.
use serde::Deserialize;
use crate::utils::string_utils::deserialize_optional_string;

/// 프로바이더 요청 파라미터
///
/// 로그인/콜백/로그아웃 모두 같은 구조를 사용하며, 쿼리 문자열과 폼 본문을 합쳐서 만듭니다.
/// 프로바이더마다 사용하는 필드가 다릅니다.
///
/// | 필드 | 사용처 |
/// |------|--------|
/// | `redirect` | 모든 프로바이더: 완료 후 돌아갈 주소 |
/// | `code`, `state` | Discord 콜백, Roblox 검증(`code`) |
/// | `token` | LastFM 콜백 |
/// | `username` | Roblox 검증 시작 |
/// | `error`, `error_description` | 프로바이더가 보고한 실패 |
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub redirect: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub error_description: Option<String>,
}

impl ProviderParams {
    /// 쿼리 값을 우선하고, 비어 있는 필드만 폼 값으로 채웁니다.
    pub fn merge(self, form: ProviderParams) -> Self {
        Self {
            redirect: self.redirect.or(form.redirect),
            code: self.code.or(form.code),
            state: self.state.or(form.state),
            token: self.token.or(form.token),
            username: self.username.or(form.username),
            error: self.error.or(form.error),
            error_description: self.error_description.or(form.error_description),
        }
    }
}

/// 폼 또는 쿼리의 `redirect` 값만 필요한 요청
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedirectParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub redirect: Option<String>,
}
