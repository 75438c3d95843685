use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_range: Option<String>,
    pub base_price: Option<i64>,
    pub currency: Option<String>,
    pub min_order_quantity: Option<i32>,
    pub country_of_origin: Option<String>,
    pub tags: Option<Vec<String>>,
    pub certifications: Option<String>,
    pub images: Option<Vec<String>>,
    /// Defaults to "pending" when omitted.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<String>,
    pub base_price: Option<i64>,
    pub currency: Option<String>,
    pub min_order_quantity: Option<i32>,
    pub country_of_origin: Option<String>,
    pub tags: Option<Vec<String>>,
    pub certifications: Option<String>,
    pub images: Option<Vec<String>>,
    /// Admin only.
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    pub items: Vec<String>,
}
