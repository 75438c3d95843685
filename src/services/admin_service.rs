use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::{
    domain::UserRole,
    dto::admin::{AnalyticsSummary, UserList},
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        users::{Column as UserCol, Entity as Users},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_role},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn analytics(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AnalyticsSummary>> {
    ensure_role(user, UserRole::Admin, "Admin access required")?;

    let total_users = Users::find().count(&state.orm).await?;
    let active_suppliers = Users::find()
        .filter(
            Condition::all()
                .add(UserCol::Role.eq(UserRole::Supplier.as_str()))
                .add(UserCol::Verified.eq(true)),
        )
        .count(&state.orm)
        .await?;
    let total_orders = Orders::find().count(&state.orm).await?;

    let totals: Vec<i64> = Orders::find()
        .select_only()
        .column(OrderCol::TotalAmount)
        .into_tuple()
        .all(&state.orm)
        .await?;
    let gross_merchandise_value: i64 = totals.iter().sum();

    let average_order_value = if total_orders > 0 {
        gross_merchandise_value / total_orders as i64
    } else {
        0
    };

    Ok(ApiResponse::success(
        "Analytics",
        AnalyticsSummary {
            total_users,
            active_suppliers,
            total_orders,
            gross_merchandise_value,
            average_order_value,
        },
        Some(Meta::empty()),
    ))
}

/// Every account, newest first. The password hash stays behind in the
/// entity layer, as everywhere else.
pub async fn list_users(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    ensure_role(user, UserRole::Admin, "Admin access required")?;

    let items = Users::find()
        .order_by_desc(UserCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success("Users", UserList { items }, None))
}
