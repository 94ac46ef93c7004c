//! 응답 헬퍼
//!
//! 브라우저 흐름과 API 흐름을 같은 핸들러에서 처리합니다.
//! 돌아갈 주소(`redirect`)가 있으면 302로, 없으면 JSON 봉투로 응답합니다.

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder, ResponseError};
use serde::Serialize;
use crate::config::CookieConfig;
use crate::core::registry::AppServices;
use crate::domain::dto::{ApiResponse, RedirectParams};
use crate::errors::{AppError, AppResult};
use crate::utils::string_utils::append_query;

/// `token`, `redirect` 쿠키 생성기
#[derive(Clone)]
pub struct SessionCookies {
    config: CookieConfig,
    session_hours: i64,
}

impl SessionCookies {
    pub fn new(services: &AppServices) -> Self {
        Self {
            config: services.cookies.clone(),
            session_hours: services.session_hours,
        }
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build(name, value)
            .domain(self.config.domain.clone())
            .path("/")
            .http_only(true)
            .secure(self.config.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .finish()
    }

    fn removal(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new(), Duration::ZERO);
        cookie.make_removal();
        cookie
    }

    pub fn token(&self, value: &str) -> Cookie<'static> {
        self.build(CookieConfig::TOKEN, value.to_string(), Duration::hours(self.session_hours))
    }

    pub fn clear_token(&self) -> Cookie<'static> {
        self.removal(CookieConfig::TOKEN)
    }

    /// 로그인 시작부터 콜백까지만 유지됩니다.
    pub fn redirect(&self, value: &str) -> Cookie<'static> {
        self.build(CookieConfig::REDIRECT, value.to_string(), Duration::minutes(10))
    }

    pub fn clear_redirect(&self) -> Cookie<'static> {
        self.removal(CookieConfig::REDIRECT)
    }
}

/// 요청에 남아 있는 `redirect` 쿠키 값
pub fn stored_redirect(req: &HttpRequest) -> Option<String> {
    req.cookie(CookieConfig::REDIRECT)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 302 응답 빌더
pub fn found(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, location.to_string()));
    builder
}

/// 쿼리를 우선하고, 없으면 폼 본문의 `redirect`를 씁니다.
pub fn redirect_param(query: web::Query<RedirectParams>, form: Option<web::Form<RedirectParams>>) -> Option<String> {
    query.into_inner()
        .redirect
        .or_else(|| form.and_then(|f| f.into_inner().redirect))
}

/// 성공 응답 선택기
///
/// 돌아갈 주소가 있으면 302, 없으면 `200 { result, error: "", code: 200 }`.
pub struct Completion {
    builder: HttpResponseBuilder,
    redirected: bool,
}

impl Completion {
    pub fn new(redirect: Option<&str>) -> Self {
        match redirect {
            Some(location) => Self { builder: found(location), redirected: true },
            None => Self { builder: HttpResponse::Ok(), redirected: false },
        }
    }

    pub fn cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.builder.cookie(cookie);
        self
    }

    pub fn body<T: Serialize>(mut self, result: T) -> HttpResponse {
        if self.redirected {
            self.builder.finish()
        } else {
            self.builder.json(ApiResponse::ok(result))
        }
    }
}

/// 실패 응답 선택기
///
/// 돌아갈 주소가 있으면 `<redirect>?error=<메시지>`로 보내고 `redirect` 쿠키를 지웁니다.
/// 없으면 [`AppError`]의 JSON 봉투를 그대로 씁니다.
pub struct ErrorReporter {
    cookies: SessionCookies,
    redirect: Option<String>,
}

impl ErrorReporter {
    pub fn new(cookies: SessionCookies, redirect: Option<String>) -> Self {
        Self { cookies, redirect }
    }

    pub fn report(&self, error: AppError) -> HttpResponse {
        match &self.redirect {
            Some(redirect) => {
                log::info!("요청 실패, 리다이렉트로 전달: {}", error);
                found(&append_query(redirect, "error", error.message()))
                    .cookie(self.cookies.clear_redirect())
                    .finish()
            }
            None => error.error_response(),
        }
    }

    pub fn respond(&self, result: AppResult<HttpResponse>) -> HttpResponse {
        result.unwrap_or_else(|e| self.report(e))
    }
}
