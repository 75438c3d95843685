use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Inquiry;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInquiryRequest {
    pub product_id: Uuid,
    pub supplier_id: Uuid,
    pub inquiry_type: String,
    pub message: String,
    pub requirements: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PostMessageRequest {
    pub content: String,
}

/// Message joined with its sender, as shown in the thread view.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageView {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    pub sender_id: Uuid,
    pub sender_email: Option<String>,
    pub sender_role: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InquiryWithMessages {
    pub inquiry: Inquiry,
    pub messages: Vec<MessageView>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct InquiryList {
    #[schema(value_type = Vec<Inquiry>)]
    pub items: Vec<Inquiry>,
}
