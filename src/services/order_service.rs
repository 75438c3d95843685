use std::str::FromStr;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    authz::{self, Action},
    domain::{OrderStatus, UserRole},
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_role(user, UserRole::Buyer, "Only buyers can create orders")?;

    let mut errors = Vec::new();
    if payload.products.is_empty() {
        errors.push("products must not be empty".to_string());
    }
    if payload.shipping_address.trim().is_empty() {
        errors.push("shipping_address is required".to_string());
    }
    if payload.total_amount <= 0 {
        errors.push("total_amount must be positive".to_string());
    }
    for item in &payload.products {
        if item.quantity <= 0 {
            errors.push(format!("invalid quantity for product {}", item.product_id));
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        buyer_id: Set(user.user_id),
        supplier_id: Set(payload.supplier_id),
        total_amount: Set(payload.total_amount),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        shipping_address: Set(payload.shipping_address),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(payload.products.len());
    for input in payload.products {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(input.product_id),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
            specifications: Set(input.specifications),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(item.into());
    }

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: order.into(),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Buyer/supplier scoped listing with line items, newest first.
pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let condition = match user.role {
        UserRole::Buyer => Condition::all().add(OrderCol::BuyerId.eq(user.user_id)),
        UserRole::Supplier => Condition::all().add(OrderCol::SupplierId.eq(user.user_id)),
        UserRole::Admin => {
            return Err(AppError::Forbidden("No order listing for this role".into()));
        }
    };

    let orders = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(orders.len());
    for order in orders {
        let line_items = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order.id))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(OrderItem::from)
            .collect();
        items.push(OrderWithItems {
            order: order.into(),
            items: line_items,
        });
    }

    Ok(ApiResponse::success("Orders", OrderList { items }, None))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    authz::order_action(&order, user, Action::Read)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: order.into(),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Supplier-only, and only along the transition table.
pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    authz::order_action(&order, user, Action::UpdateStatus)?;

    let current = OrderStatus::from_str(&order.status)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("stored order status is invalid")))?;
    let next = OrderStatus::from_str(&payload.status)?;

    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot transition order from {current} to {next}"
        )));
    }

    let mut active: OrderActive = order.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order status updated",
        order.into(),
        Some(Meta::empty()),
    ))
}
