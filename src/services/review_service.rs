use std::str::FromStr;

use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{OrderStatus, UserRole},
    dto::reviews::{CreateReviewRequest, ReviewList, ReviewView},
    entity::{
        orders::Entity as Orders,
        products::{ActiveModel as ProductActive, Entity as Products},
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::Review,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// One review per (order, product, buyer), gated on a delivered order owned
/// by the caller. The product's running rating is folded in the same
/// transaction.
pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    ensure_role(user, UserRole::Buyer, "Only buyers can submit reviews")?;

    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::Validation(vec![
            "rating must be between 1 and 5".to_string(),
        ]));
    }
    if payload.comment.trim().is_empty() {
        return Err(AppError::Validation(vec!["comment is required".to_string()]));
    }

    let order = Orders::find_by_id(payload.order_id).one(&state.orm).await?;
    let delivered = order.as_ref().is_some_and(|o| {
        o.buyer_id == user.user_id
            && OrderStatus::from_str(&o.status)
                .map(|s| s == OrderStatus::Delivered)
                .unwrap_or(false)
    });
    if !delivered {
        return Err(AppError::Forbidden(
            "You can only review delivered orders you placed".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    // Uniqueness of (order, product, buyer) is enforced by the table
    // constraint, so a concurrent duplicate still comes back as 409.
    let inserted = ReviewActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(payload.product_id),
        order_id: Set(payload.order_id),
        buyer_id: Set(user.user_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        created_at: NotSet,
    }
    .insert(&txn)
    .await;
    let review = match inserted {
        Ok(review) => review,
        Err(err) => {
            return Err(match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::Conflict("You have already reviewed this order".into())
                }
                _ => err.into(),
            });
        }
    };

    if let Some(product) = Products::find_by_id(payload.product_id).one(&txn).await? {
        let total = product.rating_average * f64::from(product.rating_count)
            + f64::from(payload.rating);
        let count = product.rating_count + 1;
        let mut active: ProductActive = product.into();
        active.rating_count = Set(count);
        active.rating_average = Set(total / f64::from(count));
        active.update(&txn).await?;
    }

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "review_create",
        "reviews",
        serde_json::json!({ "review_id": review.id, "product_id": review.product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review submitted",
        review.into(),
        Some(Meta::empty()),
    ))
}

/// Public listing for a product, newest first, with buyer email and the
/// arithmetic mean rating.
pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    let rows = Reviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .order_by_desc(ReviewCol::CreatedAt)
        .find_also_related(Users)
        .all(&state.orm)
        .await?;

    let mut sum = 0i64;
    let reviews: Vec<ReviewView> = rows
        .into_iter()
        .map(|(review, buyer)| {
            sum += i64::from(review.rating);
            let review: Review = review.into();
            ReviewView {
                id: review.id,
                product_id: review.product_id,
                order_id: review.order_id,
                buyer_id: review.buyer_id,
                buyer_email: buyer.map(|u| u.email),
                rating: review.rating,
                comment: review.comment,
                created_at: review.created_at,
            }
        })
        .collect();

    let avg_rating = if reviews.is_empty() {
        0.0
    } else {
        sum as f64 / reviews.len() as f64
    };

    Ok(ApiResponse::success(
        "Reviews",
        ReviewList {
            reviews,
            avg_rating,
        },
        None,
    ))
}
