//! 결제 프로바이더(Stripe) 응답 모델

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BillingCustomer {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BillingSubscription {
    pub id: String,
    #[serde(default)]
    pub status: String,
}

/// Stripe 에러 봉투 (`{"error": {"message": "..."}}`)
#[derive(Debug, Clone, Deserialize)]
pub struct BillingErrorResponse {
    pub error: BillingErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillingErrorBody {
    #[serde(default)]
    pub message: String,
}
