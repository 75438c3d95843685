use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity;

/// Identity record as exposed over the API. The password hash never leaves
/// the entity layer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub verified: bool,
    pub business_details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::users::Model> for User {
    fn from(model: entity::users::Model) -> Self {
        User {
            id: model.id,
            email: model.email,
            phone: model.phone,
            role: model.role,
            verified: model.verified,
            business_details: model.business_details,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupplierProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub description: String,
    pub established_year: Option<i32>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub certifications: Option<String>,
    pub business_license: Option<String>,
    pub contact_info: Option<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub business_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::supplier_profiles::Model> for SupplierProfile {
    fn from(model: entity::supplier_profiles::Model) -> Self {
        SupplierProfile {
            id: model.id,
            user_id: model.user_id,
            company_name: model.company_name,
            description: model.description,
            established_year: model.established_year,
            city: model.city,
            province: model.province,
            country: model.country,
            certifications: model.certifications,
            business_license: model.business_license,
            contact_info: model.contact_info,
            email_verified: model.email_verified,
            phone_verified: model.phone_verified,
            business_verified: model.business_verified,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Rating {
    pub average: f64,
    pub count: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_range: Option<String>,
    pub base_price: Option<i64>,
    pub currency: String,
    pub min_order_quantity: i32,
    pub country_of_origin: Option<String>,
    pub tags: Vec<String>,
    pub certifications: Option<String>,
    pub images: Vec<String>,
    pub status: String,
    pub is_active: bool,
    pub views: i64,
    pub inquiries: i64,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::products::Model> for Product {
    fn from(model: entity::products::Model) -> Self {
        Product {
            id: model.id,
            supplier_id: model.supplier_id,
            name: model.name,
            description: model.description,
            category: model.category,
            price_range: model.price_range,
            base_price: model.base_price,
            currency: model.currency,
            min_order_quantity: model.min_order_quantity,
            country_of_origin: model.country_of_origin,
            tags: string_list(model.tags),
            certifications: model.certifications,
            images: string_list(model.images),
            status: model.status,
            is_active: model.is_active,
            views: model.views,
            inquiries: model.inquiries,
            rating: Rating {
                average: model.rating_average,
                count: model.rating_count,
            },
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Inquiry {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub supplier_id: Uuid,
    pub product_id: Uuid,
    pub inquiry_type: String,
    pub message: String,
    pub requirements: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<entity::inquiries::Model> for Inquiry {
    fn from(model: entity::inquiries::Model) -> Self {
        Inquiry {
            id: model.id,
            buyer_id: model.buyer_id,
            supplier_id: model.supplier_id,
            product_id: model.product_id,
            inquiry_type: model.inquiry_type,
            message: model.message,
            requirements: model.requirements,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<entity::messages::Model> for Message {
    fn from(model: entity::messages::Model) -> Self {
        Message {
            id: model.id,
            inquiry_id: model.inquiry_id,
            sender_id: model.sender_id,
            content: model.content,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub supplier_id: Uuid,
    pub total_amount: i64,
    pub status: String,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::orders::Model> for Order {
    fn from(model: entity::orders::Model) -> Self {
        Order {
            id: model.id,
            buyer_id: model.buyer_id,
            supplier_id: model.supplier_id,
            total_amount: model.total_amount,
            status: model.status,
            shipping_address: model.shipping_address,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub specifications: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::order_items::Model> for OrderItem {
    fn from(model: entity::order_items::Model) -> Self {
        OrderItem {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            specifications: model.specifications,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::payments::Model> for Payment {
    fn from(model: entity::payments::Model) -> Self {
        Payment {
            id: model.id,
            order_id: model.order_id,
            amount: model.amount,
            currency: model.currency,
            status: model.status,
            provider: model.provider,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub order_id: Uuid,
    pub buyer_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<entity::reviews::Model> for Review {
    fn from(model: entity::reviews::Model) -> Self {
        Review {
            id: model.id,
            product_id: model.product_id,
            order_id: model.order_id,
            buyer_id: model.buyer_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

fn string_list(value: serde_json::Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}
