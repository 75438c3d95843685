use sea_orm::entity::prelude::*;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
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
    pub tags: Value,
    pub certifications: Option<String>,
    pub images: Value,
    pub status: String,
    pub is_active: bool,
    pub views: i64,
    pub inquiries: i64,
    pub rating_average: f64,
    pub rating_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SupplierId",
        to = "super::users::Column::Id"
    )]
    Supplier,
    #[sea_orm(has_many = "super::inquiries::Entity")]
    Inquiries,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::inquiries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inquiries.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
