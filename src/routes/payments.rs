use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::payments::{InitiatePaymentRequest, PaymentList, VerifyPaymentRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Payment,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/initiate", post(initiate))
        .route("/verify", post(verify))
        .route("/history", get(history))
}

#[utoipa::path(
    post,
    path = "/api/payments/initiate",
    request_body = InitiatePaymentRequest,
    responses(
        (status = 201, description = "Payment record created", body = ApiResponse<Payment>),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn initiate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<InitiatePaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::initiate_payment(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment status updated", body = ApiResponse<Payment>),
        (status = 400, description = "Illegal transition"),
        (status = 403, description = "Not a party to the payment's order"),
        (status = 404, description = "Payment not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn verify(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<VerifyPaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::verify_payment(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/history",
    responses(
        (status = 200, description = "Payments on the caller's orders", body = ApiResponse<PaymentList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PaymentList>>> {
    let resp = payment_service::payment_history(&state, &user).await?;
    Ok(Json(resp))
}
