use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::admin::{AnalyticsSummary, UserList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(analytics))
        .route("/users", get(list_users))
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    responses(
        (status = 200, description = "Platform aggregates", body = ApiResponse<AnalyticsSummary>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AnalyticsSummary>>> {
    let resp = admin_service::analytics(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All accounts, newest first", body = ApiResponse<UserList>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::list_users(&state, &user).await?;
    Ok(Json(resp))
}
