use std::str::FromStr;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    authz::{self, Action},
    domain::PaymentStatus,
    dto::payments::{InitiatePaymentRequest, PaymentList, PaymentWithOrder, VerifyPaymentRequest},
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        payments::{ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Payment,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Creates a mock-provider payment record against an order. Any authenticated
/// caller may initiate; verification is where the party check bites.
pub async fn initiate_payment(
    state: &AppState,
    user: &AuthUser,
    payload: InitiatePaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    let mut errors = Vec::new();
    if payload.amount <= 0 {
        errors.push("amount must be positive".to_string());
    }
    if payload.currency.trim().is_empty() {
        errors.push("currency is required".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let order = Orders::find_by_id(payload.order_id).one(&state.orm).await?;
    if order.is_none() {
        return Err(AppError::NotFound);
    }

    let payment = PaymentActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(payload.order_id),
        amount: Set(payload.amount),
        currency: Set(payload.currency),
        status: Set(PaymentStatus::Initiated.as_str().to_string()),
        provider: Set("mock".to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "payment_initiate",
        "payments",
        serde_json::json!({ "payment_id": payment.id, "order_id": payment.order_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment initiated",
        payment.into(),
        Some(Meta::empty()),
    ))
}

/// Moves a payment through its status table. The caller must be a party to
/// the payment's order.
pub async fn verify_payment(
    state: &AppState,
    user: &AuthUser,
    payload: VerifyPaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    let payment = Payments::find_by_id(payload.payment_id)
        .one(&state.orm)
        .await?;
    let payment = match payment {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let order = Orders::find_by_id(payment.order_id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    authz::payment_action(&order, user, Action::Verify)?;

    let current = PaymentStatus::from_str(&payment.status)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("stored payment status is invalid")))?;
    let next = PaymentStatus::from_str(&payload.status)?;

    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot transition payment from {current} to {next}"
        )));
    }

    let mut active: PaymentActive = payment.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let payment = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "payment_verify",
        "payments",
        serde_json::json!({ "payment_id": payment.id, "status": payment.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment updated",
        payment.into(),
        Some(Meta::empty()),
    ))
}

/// Payments on orders where the caller is buyer or supplier, newest first,
/// order embedded.
pub async fn payment_history(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PaymentList>> {
    let items = Payments::find()
        .find_also_related(Orders)
        .filter(
            Condition::any()
                .add(OrderCol::BuyerId.eq(user.user_id))
                .add(OrderCol::SupplierId.eq(user.user_id)),
        )
        .order_by_desc(PaymentCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(payment, order)| PaymentWithOrder {
            payment: payment.into(),
            order: order.map(Into::into),
        })
        .collect();

    Ok(ApiResponse::success(
        "Payment history",
        PaymentList { items },
        None,
    ))
}
