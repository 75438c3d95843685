use std::str::FromStr;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    authz::{self, Action},
    domain::{ProductStatus, UserRole},
    dto::products::{CategoryList, CreateProductRequest, ProductList, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{MyProductsQuery, ProductQuery},
    state::AppState,
};

/// Public catalog listing: active, non-deleted products plus caller filters,
/// newest first.
pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let status = match query.status.as_deref() {
        Some(s) => ProductStatus::from_str(s)?,
        None => ProductStatus::Active,
    };

    let mut condition = Condition::all()
        .add(Column::Status.eq(status.as_str()))
        .add(Column::IsActive.eq(true));

    if let Some(category) = query.category.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    if let Some(country) = query.country.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::CountryOfOrigin.eq(country.clone()));
    }

    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern.clone()))
                .add(
                    Expr::col(Column::Tags)
                        .cast_as(Alias::new("text"))
                        .ilike(pattern),
                ),
        );
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::BasePrice.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::BasePrice.lte(max_price));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    // Best-effort view counter: spawned so it never slows or fails the read.
    let orm = state.orm.clone();
    tokio::spawn(async move {
        let result = Products::update_many()
            .col_expr(Column::Views, Expr::col(Column::Views).add(1))
            .filter(Column::Id.eq(id))
            .exec(&orm)
            .await;
        if let Err(err) = result {
            tracing::warn!(error = %err, product_id = %id, "view counter update failed");
        }
    });

    Ok(ApiResponse::success("Product", product.into(), None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_role(user, UserRole::Supplier, "Only suppliers can create products")?;

    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if payload.description.trim().is_empty() {
        errors.push("description is required".to_string());
    }
    if payload.category.trim().is_empty() {
        errors.push("category is required".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let status = match payload.status.as_deref() {
        Some(s) => ProductStatus::from_str(s)?,
        None => ProductStatus::Pending,
    };

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        supplier_id: Set(user.user_id),
        name: Set(payload.name),
        description: Set(payload.description),
        category: Set(payload.category),
        price_range: Set(payload.price_range),
        base_price: Set(payload.base_price),
        currency: Set(payload.currency.unwrap_or_else(|| "USD".to_string())),
        min_order_quantity: Set(payload.min_order_quantity.unwrap_or(1)),
        country_of_origin: Set(payload.country_of_origin),
        tags: Set(serde_json::json!(payload.tags.unwrap_or_default())),
        certifications: Set(payload.certifications),
        images: Set(serde_json::json!(payload.images.unwrap_or_default())),
        status: Set(status.as_str().to_string()),
        is_active: Set(true),
        views: Set(0),
        inquiries: Set(0),
        rating_average: Set(0.0),
        rating_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    authz::product_action(&existing, user, Action::Update)?;
    if payload.status.is_some() {
        authz::product_action(&existing, user, Action::UpdateStatus)?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(price_range) = payload.price_range {
        active.price_range = Set(Some(price_range));
    }
    if let Some(base_price) = payload.base_price {
        active.base_price = Set(Some(base_price));
    }
    if let Some(currency) = payload.currency {
        active.currency = Set(currency);
    }
    if let Some(moq) = payload.min_order_quantity {
        active.min_order_quantity = Set(moq);
    }
    if let Some(country) = payload.country_of_origin {
        active.country_of_origin = Set(Some(country));
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(serde_json::json!(tags));
    }
    if let Some(certifications) = payload.certifications {
        active.certifications = Set(Some(certifications));
    }
    if let Some(images) = payload.images {
        active.images = Set(serde_json::json!(images));
    }
    if let Some(status) = payload.status {
        active.status = Set(ProductStatus::from_str(&status)?.as_str().to_string());
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product.into(),
        Some(Meta::empty()),
    ))
}

/// Soft delete: the row stays, is_active flips off, the public list skips it.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    authz::product_action(&existing, user, Action::Delete)?;

    let mut active: ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Supplier's own products: no public status/is_active restriction beyond
/// the soft-delete flag, optional status filter.
pub async fn my_products(
    state: &AppState,
    user: &AuthUser,
    query: MyProductsQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all()
        .add(Column::SupplierId.eq(user.user_id))
        .add(Column::IsActive.eq(true));
    if let Some(status) = query.status.as_deref() {
        condition = condition.add(Column::Status.eq(ProductStatus::from_str(status)?.as_str()));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "My products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let mut items: Vec<String> = Products::find()
        .select_only()
        .column(Column::Category)
        .distinct()
        .filter(Column::IsActive.eq(true))
        .into_tuple()
        .all(&state.orm)
        .await?;
    items.sort();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    ))
}
