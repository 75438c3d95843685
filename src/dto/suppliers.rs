use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertSupplierRequest {
    pub company_name: String,
    pub description: String,
    pub established_year: Option<i32>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub certifications: Option<String>,
    pub business_license: Option<String>,
    pub contact_info: Option<String>,
}

/// Partial update: an omitted flag keeps its stored value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetVerificationRequest {
    pub email_verified: Option<bool>,
    pub phone_verified: Option<bool>,
    pub business_verified: Option<bool>,
}
