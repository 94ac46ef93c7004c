//! 쿼리 파라미터 정리와 리다이렉트 URL 조립

use serde::Deserialize;

/// 공백을 걷어낸 값. 비어 있으면 `None`입니다.
pub fn clean_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// 쿼리/폼 파라미터용. `?redirect=`처럼 값이 비어 있으면 파라미터가 없는 것으로 봅니다.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(clean_optional_string)
}

/// URL에 쿼리 파라미터 하나를 덧붙입니다.
///
/// 값은 퍼센트 인코딩되며, 이미 쿼리가 있으면 `&`로 이어 붙입니다.
///
/// # 예제
/// ```rust,ignore
/// assert_eq!(
///     append_query("https://app.example.com/done", "error", "Code not found"),
///     "https://app.example.com/done?error=Code%20not%20found"
/// );
/// ```
pub fn append_query(url: &str, key: &str, value: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, key, urlencoding::encode(value))
}
