use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::User;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    /// "buyer" or "supplier"; admins are seeded out of band.
    pub role: String,
    pub business_details: Option<String>,
}

/// Login accepts either key; at least one of email/phone must be present.
#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Requests a fresh challenge for the account matching email/phone.
/// `kind` selects the channel: "email" gets a token, "phone" gets a code.
#[derive(Deserialize, Debug, ToSchema)]
pub struct SendVerificationRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The generated challenge. A real deployment would deliver this via
/// email/SMS instead of returning it in the response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerificationChallenge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Redeems a challenge: exactly one of token/code is expected.
#[derive(Deserialize, Debug, ToSchema)]
pub struct VerifyRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub token: Option<String>,
    pub code: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateProfileRequest {
    pub phone: Option<String>,
    pub business_details: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub exp: usize,
}
