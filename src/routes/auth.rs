use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};

use crate::{
    dto::auth::{
        LoginRequest, LoginResponse, RegisterRequest, SendVerificationRequest,
        UpdateProfileRequest, VerificationChallenge, VerifyRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/send-verification", post(send_verification))
        .route("/verify", post(verify))
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/logout", post(logout))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<User>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email or phone already registered"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::register_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/send-verification",
    request_body = SendVerificationRequest,
    responses(
        (status = 200, description = "Challenge generated", body = ApiResponse<VerificationChallenge>),
        (status = 400, description = "Missing contact or unknown type"),
        (status = 404, description = "No matching account"),
    ),
    tag = "Auth"
)]
pub async fn send_verification(
    State(state): State<AppState>,
    Json(payload): Json<SendVerificationRequest>,
) -> AppResult<Json<ApiResponse<VerificationChallenge>>> {
    let resp = auth_service::send_verification(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Account verified", body = ApiResponse<User>),
        (status = 400, description = "Invalid or expired token/code"),
        (status = 404, description = "No matching account"),
    ),
    tag = "Auth"
)]
pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::verify_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 401, description = "Unauthenticated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::current_user(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<User>),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::update_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

// Tokens are not revocable server-side; logout just acknowledges so the
// client can drop its copy.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<serde_json::Value>),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(user: AuthUser) -> Json<ApiResponse<serde_json::Value>> {
    tracing::debug!(user_id = %user.user_id, "logout acknowledged");
    Json(ApiResponse::success(
        "Logged out",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
