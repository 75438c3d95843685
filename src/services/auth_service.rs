use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::{OsRng, RngCore};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    domain::UserRole,
    dto::auth::{
        Claims, LoginRequest, LoginResponse, RegisterRequest, SendVerificationRequest,
        UpdateProfileRequest, VerificationChallenge, VerifyRequest,
    },
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let mut errors = Vec::new();
    if payload.email.trim().is_empty() {
        errors.push("email is required".to_string());
    }
    if payload.password.len() < 8 {
        errors.push("password must be at least 8 characters".to_string());
    }
    let role = payload.role.parse::<UserRole>()?;
    if role == UserRole::Admin {
        errors.push("cannot register as admin".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut taken = Condition::any().add(UserCol::Email.eq(payload.email.as_str()));
    if let Some(phone) = payload.phone.as_deref() {
        taken = taken.add(UserCol::Phone.eq(phone));
    }
    let existing = Users::find().filter(taken).one(&state.orm).await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "A user with this email or phone already exists".into(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        phone: Set(payload.phone),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_string()),
        verified: Set(false),
        business_details: Set(payload.business_details),
        email_verification_token: Set(None),
        email_verification_token_expires: Set(None),
        phone_verification_code: Set(None),
        phone_verification_code_expires: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.id,
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role }),
    )
    .await;

    Ok(ApiResponse::success("User created", user.into(), None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let mut condition = Condition::any();
    match (payload.email.as_deref(), payload.phone.as_deref()) {
        (None, None) => {
            return Err(AppError::Validation(vec![
                "email or phone is required".to_string(),
            ]));
        }
        (email, phone) => {
            if let Some(email) = email {
                condition = condition.add(UserCol::Email.eq(email));
            }
            if let Some(phone) = phone {
                condition = condition.add(UserCol::Phone.eq(phone));
            }
        }
    }

    let user = Users::find().filter(condition).one(&state.orm).await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = issue_token(&user)?;

    audit::record(
        &state.pool,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let resp = LoginResponse {
        token,
        user: user.into(),
    };

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

/// Generates a verification challenge for the matching account: a 32-char
/// token for email (30 min TTL) or a 6-digit code for phone (10 min TTL).
/// The challenge is returned in the body; delivery is out of band.
pub async fn send_verification(
    state: &AppState,
    payload: SendVerificationRequest,
) -> AppResult<ApiResponse<VerificationChallenge>> {
    let user = find_by_contact(state, payload.email.as_deref(), payload.phone.as_deref()).await?;

    let challenge = match payload.kind.as_str() {
        "email" => {
            let token = Uuid::new_v4().simple().to_string();
            let expires = Utc::now() + Duration::minutes(30);

            let mut active: UserActive = user.into();
            active.email_verification_token = Set(Some(token.clone()));
            active.email_verification_token_expires = Set(Some(expires.into()));
            active.update(&state.orm).await?;

            VerificationChallenge {
                token: Some(token),
                code: None,
            }
        }
        "phone" => {
            let mut bytes = [0u8; 4];
            OsRng.fill_bytes(&mut bytes);
            let code = format!("{:06}", u32::from_le_bytes(bytes) % 900_000 + 100_000);
            let expires = Utc::now() + Duration::minutes(10);

            let mut active: UserActive = user.into();
            active.phone_verification_code = Set(Some(code.clone()));
            active.phone_verification_code_expires = Set(Some(expires.into()));
            active.update(&state.orm).await?;

            VerificationChallenge {
                token: None,
                code: Some(code),
            }
        }
        other => {
            return Err(AppError::Validation(vec![format!(
                "unknown verification type: {other}"
            )]));
        }
    };

    Ok(ApiResponse::success(
        "Verification challenge generated",
        challenge,
        Some(Meta::empty()),
    ))
}

/// Redeems a challenge: marks the account verified and clears the used
/// token/code pair.
pub async fn verify_user(
    state: &AppState,
    payload: VerifyRequest,
) -> AppResult<ApiResponse<User>> {
    let user = find_by_contact(state, payload.email.as_deref(), payload.phone.as_deref()).await?;

    let mut active: UserActive = user.clone().into();
    if let Some(token) = payload.token.as_deref() {
        if user.email_verification_token.as_deref() != Some(token) {
            return Err(AppError::BadRequest("Invalid token".into()));
        }
        let expired = user
            .email_verification_token_expires
            .is_none_or(|at| at < Utc::now());
        if expired {
            return Err(AppError::BadRequest("Token expired".into()));
        }
        active.email_verification_token = Set(None);
        active.email_verification_token_expires = Set(None);
    } else if let Some(code) = payload.code.as_deref() {
        if user.phone_verification_code.as_deref() != Some(code) {
            return Err(AppError::BadRequest("Invalid code".into()));
        }
        let expired = user
            .phone_verification_code_expires
            .is_none_or(|at| at < Utc::now());
        if expired {
            return Err(AppError::BadRequest("Code expired".into()));
        }
        active.phone_verification_code = Set(None);
        active.phone_verification_code_expires = Set(None);
    } else {
        return Err(AppError::Validation(vec![
            "token or code is required".to_string(),
        ]));
    }

    active.verified = Set(true);
    let user = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.id,
        "user_verify",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("Verified", user.into(), None))
}

async fn find_by_contact(
    state: &AppState,
    email: Option<&str>,
    phone: Option<&str>,
) -> AppResult<crate::entity::users::Model> {
    if email.is_none() && phone.is_none() {
        return Err(AppError::Validation(vec![
            "email or phone is required".to_string(),
        ]));
    }

    let mut condition = Condition::any();
    if let Some(email) = email {
        condition = condition.add(UserCol::Email.eq(email));
    }
    if let Some(phone) = phone {
        condition = condition.add(UserCol::Phone.eq(phone));
    }

    Users::find()
        .filter(condition)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn current_user(state: &AppState, auth: &AuthUser) -> AppResult<ApiResponse<User>> {
    let user = Users::find_by_id(auth.user_id).one(&state.orm).await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Current user", user.into(), None))
}

pub async fn update_profile(
    state: &AppState,
    auth: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let user = Users::find_by_id(auth.user_id).one(&state.orm).await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let mut active: UserActive = user.into();
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(details) = payload.business_details {
        active.business_details = Set(Some(details));
    }
    let user = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.id,
        "profile_update",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("Profile updated", user.into(), None))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// Sign a token carrying id, contact info and role. Seven-day expiry,
/// no server-side revocation: logout is client-side token deletion.
pub fn issue_token(user: &crate::entity::users::Model) -> AppResult<String> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::days(7))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        phone: user.phone.clone(),
        role: user.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}
