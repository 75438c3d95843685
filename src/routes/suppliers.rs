use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::suppliers::{SetVerificationRequest, UpsertSupplierRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::SupplierProfile,
    response::ApiResponse,
    services::supplier_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upsert_profile))
        .route("/{id}", get(get_profile))
        .route("/{id}/verify", post(set_verification))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    params(
        ("id" = Uuid, Path, description = "Supplier user ID")
    ),
    responses(
        (status = 200, description = "Supplier profile", body = ApiResponse<SupplierProfile>),
        (status = 404, description = "No profile for this user"),
    ),
    tag = "Suppliers"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SupplierProfile>>> {
    let resp = supplier_service::get_profile(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    request_body = UpsertSupplierRequest,
    responses(
        (status = 200, description = "Profile created or updated", body = ApiResponse<SupplierProfile>),
        (status = 403, description = "Supplier role required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn upsert_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpsertSupplierRequest>,
) -> AppResult<Json<ApiResponse<SupplierProfile>>> {
    let resp = supplier_service::upsert_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/suppliers/{id}/verify",
    params(
        ("id" = Uuid, Path, description = "Supplier user ID")
    ),
    request_body = SetVerificationRequest,
    responses(
        (status = 200, description = "Verification flags updated", body = ApiResponse<SupplierProfile>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "No profile for this user"),
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn set_verification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetVerificationRequest>,
) -> AppResult<Json<ApiResponse<SupplierProfile>>> {
    let resp = supplier_service::set_verification(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
