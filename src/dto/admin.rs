use serde::Serialize;
use utoipa::ToSchema;

use crate::models::User;

/// Platform-wide aggregates for the admin console. Amounts are minor units.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsSummary {
    pub total_users: u64,
    pub active_suppliers: u64,
    pub total_orders: u64,
    pub gross_merchandise_value: i64,
    pub average_order_value: i64,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<User>)]
    pub items: Vec<User>,
}
