//! 결제 프로바이더(Stripe) 클라이언트
//!
//! 고객 생성과 구독 생성/취소만 다룹니다. 요금 계산의 정확성은 결제 프로바이더에 맡깁니다.

use async_trait::async_trait;
use crate::clients::transport_error;
use crate::config::BillingConfig;
use crate::domain::models::providers::{BillingCustomer, BillingErrorResponse, BillingSubscription};
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "Stripe";

#[async_trait]
pub trait BillingApi: Send + Sync {
    async fn create_customer(&self, email: Option<&str>, name: &str, profile_id: &str) -> AppResult<BillingCustomer>;

    async fn create_subscription(&self, customer_id: &str, price_id: &str) -> AppResult<BillingSubscription>;

    async fn cancel_subscription(&self, subscription_id: &str) -> AppResult<()>;
}

pub struct StripeClient {
    http: reqwest::Client,
    config: BillingConfig,
}

impl StripeClient {
    pub fn new(http: reqwest::Client, config: BillingConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(SERVICE, e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<BillingErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            log::error!("Stripe 요청 실패 ({}): {}", status, message);
            return Err(AppError::ExternalServiceError(format!("Stripe 요청 실패: {}", message)));
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::ExternalServiceError(format!("Stripe 응답 파싱 실패: {}", e)))
    }
}

#[async_trait]
impl BillingApi for StripeClient {
    async fn create_customer(&self, email: Option<&str>, name: &str, profile_id: &str) -> AppResult<BillingCustomer> {
        let mut params = vec![("name", name), ("metadata[profile]", profile_id)];
        if let Some(email) = email {
            params.push(("email", email));
        }

        let response = self.http
            .post(self.endpoint("/v1/customers"))
            .bearer_auth(&self.config.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        Self::parse(response).await
    }

    async fn create_subscription(&self, customer_id: &str, price_id: &str) -> AppResult<BillingSubscription> {
        let params = [("customer", customer_id), ("items[0][price]", price_id)];

        let response = self.http
            .post(self.endpoint("/v1/subscriptions"))
            .bearer_auth(&self.config.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        Self::parse(response).await
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> AppResult<()> {
        let response = self.http
            .delete(self.endpoint(&format!("/v1/subscriptions/{}", urlencoding::encode(subscription_id))))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        Self::parse::<BillingSubscription>(response).await.map(|_| ())
    }
}
