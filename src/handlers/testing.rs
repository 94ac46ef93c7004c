//! 핸들러 테스트 공용 도구

use actix_web::dev::ServiceResponse;

/// 전체 라우트를 등록한 테스트 서비스
macro_rules! init_app {
    ($services:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($services))
                .configure(crate::routes::configure_all_routes),
        )
        .await
    };
}

/// Discord 로그인을 끝까지 진행하고 `token` 쿠키 값을 돌려줍니다.
macro_rules! login_as {
    ($app:expr, $code:expr) => {{
        use actix_web::http::header;
        use actix_web::test;

        let req = test::TestRequest::get().uri("/api/v1/auth/login/discord").to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 302);
        let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap().to_string();

        let uri = format!(
            "/api/v1/auth/callback/discord?code={}&state={}",
            $code,
            crate::handlers::testing::state_of(&location)
        );
        let resp = test::call_service(&$app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), 200);
        crate::handlers::testing::cookie_value(&resp, "token").unwrap()
    }};
}

pub(crate) use init_app;
pub(crate) use login_as;

pub fn state_of(url: &str) -> String {
    url.split("state=").nth(1).unwrap().split('&').next().unwrap().to_string()
}

pub fn cookie_value<B>(resp: &ServiceResponse<B>, name: &str) -> Option<String> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}
