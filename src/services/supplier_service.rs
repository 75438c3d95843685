use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    authz::{self, Action},
    dto::suppliers::{SetVerificationRequest, UpsertSupplierRequest},
    entity::supplier_profiles::{
        ActiveModel as ProfileActive, Column as ProfileCol, Entity as SupplierProfiles,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::SupplierProfile,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Public profile lookup, keyed by the supplier's user id.
pub async fn get_profile(
    state: &AppState,
    user_id: Uuid,
) -> AppResult<ApiResponse<SupplierProfile>> {
    let profile = SupplierProfiles::find()
        .filter(ProfileCol::UserId.eq(user_id))
        .one(&state.orm)
        .await?;
    let profile = match profile {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Supplier profile", profile.into(), None))
}

/// Create on first call, update thereafter; keyed on the caller's user id.
/// Verification flags are untouched here.
pub async fn upsert_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpsertSupplierRequest,
) -> AppResult<ApiResponse<SupplierProfile>> {
    authz::supplier_profile_action(user.user_id, user, Action::Update)?;

    let mut errors = Vec::new();
    if payload.company_name.trim().is_empty() {
        errors.push("company_name is required".to_string());
    }
    if payload.description.trim().is_empty() {
        errors.push("description is required".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let existing = SupplierProfiles::find()
        .filter(ProfileCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;

    let profile = match existing {
        Some(profile) => {
            let mut active: ProfileActive = profile.into();
            active.company_name = Set(payload.company_name);
            active.description = Set(payload.description);
            active.established_year = Set(payload.established_year);
            active.city = Set(payload.city);
            active.province = Set(payload.province);
            active.country = Set(payload.country);
            active.certifications = Set(payload.certifications);
            active.business_license = Set(payload.business_license);
            active.contact_info = Set(payload.contact_info);
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?
        }
        None => {
            ProfileActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                company_name: Set(payload.company_name),
                description: Set(payload.description),
                established_year: Set(payload.established_year),
                city: Set(payload.city),
                province: Set(payload.province),
                country: Set(payload.country),
                certifications: Set(payload.certifications),
                business_license: Set(payload.business_license),
                contact_info: Set(payload.contact_info),
                email_verified: Set(false),
                phone_verified: Set(false),
                business_verified: Set(false),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    audit::record(
        &state.pool,
        user.user_id,
        "supplier_profile_upsert",
        "supplier_profiles",
        serde_json::json!({ "profile_id": profile.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Supplier profile saved",
        profile.into(),
        Some(Meta::empty()),
    ))
}

/// Admin-only. Partial merge: an omitted flag keeps its stored value.
pub async fn set_verification(
    state: &AppState,
    user: &AuthUser,
    profile_user_id: Uuid,
    payload: SetVerificationRequest,
) -> AppResult<ApiResponse<SupplierProfile>> {
    authz::supplier_profile_action(profile_user_id, user, Action::Verify)?;

    let profile = SupplierProfiles::find()
        .filter(ProfileCol::UserId.eq(profile_user_id))
        .one(&state.orm)
        .await?;
    let profile = match profile {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ProfileActive = profile.into();
    if let Some(email_verified) = payload.email_verified {
        active.email_verified = Set(email_verified);
    }
    if let Some(phone_verified) = payload.phone_verified {
        active.phone_verified = Set(phone_verified);
    }
    if let Some(business_verified) = payload.business_verified {
        active.business_verified = Set(business_verified);
    }
    active.updated_at = Set(Utc::now().into());
    let profile = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "supplier_verify",
        "supplier_profiles",
        serde_json::json!({
            "profile_user_id": profile_user_id,
            "email_verified": profile.email_verified,
            "phone_verified": profile.phone_verified,
            "business_verified": profile.business_verified,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Verification updated",
        profile.into(),
        Some(Meta::empty()),
    ))
}
