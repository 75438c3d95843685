use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub product_id: Uuid,
    pub order_id: Uuid,
    /// 1 to 5.
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub order_id: Uuid,
    pub buyer_id: Uuid,
    pub buyer_email: Option<String>,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewList {
    pub reviews: Vec<ReviewView>,
    /// Arithmetic mean over the listed reviews, 0 when there are none.
    pub avg_rating: f64,
}
