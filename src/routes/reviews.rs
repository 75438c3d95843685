use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::reviews::{CreateReviewRequest, ReviewList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Review,
    response::ApiResponse,
    routes::params::ReviewQuery,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/", get(list_reviews))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<Review>),
        (status = 403, description = "Order not delivered or not the caller's"),
        (status = 409, description = "Already reviewed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::create_review(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    params(
        ("product_id" = Uuid, Query, description = "Product to list reviews for")
    ),
    responses(
        (status = 200, description = "Reviews with mean rating", body = ApiResponse<ReviewList>),
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_reviews(&state, query.product_id).await?;
    Ok(Json(resp))
}
