use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, Payment};

#[derive(Debug, Deserialize, ToSchema)]
pub struct InitiatePaymentRequest {
    pub order_id: Uuid,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub payment_id: Uuid,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentWithOrder {
    pub payment: Payment,
    pub order: Option<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentList {
    pub items: Vec<PaymentWithOrder>,
}
