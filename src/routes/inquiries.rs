use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::inquiries::{
        CreateInquiryRequest, InquiryList, InquiryWithMessages, PostMessageRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Inquiry, Message},
    response::ApiResponse,
    services::inquiry_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_inquiry))
        .route("/", get(list_inquiries))
        .route("/{id}", get(get_inquiry))
        .route("/{id}/messages", post(post_message))
}

#[utoipa::path(
    post,
    path = "/api/inquiries",
    request_body = CreateInquiryRequest,
    responses(
        (status = 201, description = "Inquiry created", body = ApiResponse<Inquiry>),
        (status = 403, description = "Buyer role required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inquiries"
)]
pub async fn create_inquiry(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateInquiryRequest>,
) -> AppResult<Json<ApiResponse<Inquiry>>> {
    let resp = inquiry_service::create_inquiry(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inquiries",
    responses(
        (status = 200, description = "Inquiries where the caller is a party", body = ApiResponse<InquiryList>),
        (status = 403, description = "Role has no inquiry inbox"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inquiries"
)]
pub async fn list_inquiries(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<InquiryList>>> {
    let resp = inquiry_service::list_inquiries(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inquiries/{id}",
    params(
        ("id" = Uuid, Path, description = "Inquiry ID")
    ),
    responses(
        (status = 200, description = "Inquiry with thread", body = ApiResponse<InquiryWithMessages>),
        (status = 403, description = "Not a party"),
        (status = 404, description = "Inquiry not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inquiries"
)]
pub async fn get_inquiry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InquiryWithMessages>>> {
    let resp = inquiry_service::get_inquiry(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/inquiries/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Inquiry ID")
    ),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message appended", body = ApiResponse<Message>),
        (status = 403, description = "Not a party"),
        (status = 404, description = "Inquiry not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inquiries"
)]
pub async fn post_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostMessageRequest>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let resp = inquiry_service::post_message(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
