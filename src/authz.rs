//! Per-entity authorization predicates.
//!
//! Every ownership rule lives here, parameterized by (entity, caller, action),
//! so handlers and services share one definition and the rules are testable
//! without a database.

use crate::{
    domain::UserRole,
    entity::{inquiries, orders, products},
    error::AppError,
    middleware::auth::AuthUser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
    UpdateStatus,
    PostMessage,
    Verify,
}

pub fn product_action(
    product: &products::Model,
    caller: &AuthUser,
    action: Action,
) -> Result<(), AppError> {
    match action {
        Action::Update | Action::Delete => {
            if product.supplier_id == caller.user_id || caller.role == UserRole::Admin {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Not authorized to modify this product".into(),
                ))
            }
        }
        // Moderation: only admins move a product between statuses.
        Action::UpdateStatus => {
            if caller.role == UserRole::Admin {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Only admins can change product status".into(),
                ))
            }
        }
        _ => Ok(()),
    }
}

pub fn inquiry_action(
    inquiry: &inquiries::Model,
    caller: &AuthUser,
    action: Action,
) -> Result<(), AppError> {
    match action {
        Action::Read | Action::PostMessage => {
            if inquiry.buyer_id == caller.user_id || inquiry.supplier_id == caller.user_id {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Not a party to this inquiry".into(),
                ))
            }
        }
        _ => Err(AppError::Forbidden("Unsupported inquiry action".into())),
    }
}

pub fn order_action(
    order: &orders::Model,
    caller: &AuthUser,
    action: Action,
) -> Result<(), AppError> {
    match action {
        Action::Read => {
            if order.buyer_id == caller.user_id || order.supplier_id == caller.user_id {
                Ok(())
            } else {
                Err(AppError::Forbidden("Not a party to this order".into()))
            }
        }
        // Only the supplier side moves an order through its lifecycle;
        // there is no admin override.
        Action::UpdateStatus => {
            if order.supplier_id == caller.user_id {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Only the supplier can update order status".into(),
                ))
            }
        }
        _ => Err(AppError::Forbidden("Unsupported order action".into())),
    }
}

/// Payment access is defined by the underlying order: both verify and read
/// require the caller to be a party to it.
pub fn payment_action(
    order: &orders::Model,
    caller: &AuthUser,
    action: Action,
) -> Result<(), AppError> {
    match action {
        Action::Read | Action::Verify => {
            if order.buyer_id == caller.user_id || order.supplier_id == caller.user_id {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Not a party to this payment's order".into(),
                ))
            }
        }
        _ => Err(AppError::Forbidden("Unsupported payment action".into())),
    }
}

pub fn supplier_profile_action(
    profile_user_id: uuid::Uuid,
    caller: &AuthUser,
    action: Action,
) -> Result<(), AppError> {
    match action {
        Action::Update => {
            if caller.role == UserRole::Supplier && profile_user_id == caller.user_id {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Suppliers can only update their own profile".into(),
                ))
            }
        }
        Action::Verify => {
            if caller.role == UserRole::Admin {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Only admins can set verification flags".into(),
                ))
            }
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn caller(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: format!("{}@example.com", role.as_str()),
            phone: None,
            role,
        }
    }

    fn order_between(buyer: &AuthUser, supplier: &AuthUser) -> orders::Model {
        orders::Model {
            id: Uuid::new_v4(),
            buyer_id: buyer.user_id,
            supplier_id: supplier.user_id,
            total_amount: 30000,
            status: "pending".into(),
            shipping_address: "42 Dock Rd".into(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn product_of(supplier: &AuthUser) -> products::Model {
        products::Model {
            id: Uuid::new_v4(),
            supplier_id: supplier.user_id,
            name: "Lathe".into(),
            description: "CNC lathe".into(),
            category: "Manufacturing".into(),
            price_range: Some("$100-200".into()),
            base_price: None,
            currency: "USD".into(),
            min_order_quantity: 1,
            country_of_origin: None,
            tags: serde_json::json!([]),
            certifications: None,
            images: serde_json::json!([]),
            status: "pending".into(),
            is_active: true,
            views: 0,
            inquiries: 0,
            rating_average: 0.0,
            rating_count: 0,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn product_update_allows_owner_and_admin_only() {
        let supplier = caller(UserRole::Supplier);
        let admin = caller(UserRole::Admin);
        let other = caller(UserRole::Supplier);
        let product = product_of(&supplier);

        assert!(product_action(&product, &supplier, Action::Update).is_ok());
        assert!(product_action(&product, &admin, Action::Update).is_ok());
        assert!(product_action(&product, &other, Action::Update).is_err());
    }

    #[test]
    fn product_status_change_is_admin_only() {
        let supplier = caller(UserRole::Supplier);
        let admin = caller(UserRole::Admin);
        let product = product_of(&supplier);

        assert!(product_action(&product, &admin, Action::UpdateStatus).is_ok());
        assert!(product_action(&product, &supplier, Action::UpdateStatus).is_err());
    }

    #[test]
    fn order_status_update_is_supplier_only_even_for_admin() {
        let buyer = caller(UserRole::Buyer);
        let supplier = caller(UserRole::Supplier);
        let admin = caller(UserRole::Admin);
        let order = order_between(&buyer, &supplier);

        assert!(order_action(&order, &supplier, Action::UpdateStatus).is_ok());
        assert!(order_action(&order, &buyer, Action::UpdateStatus).is_err());
        assert!(order_action(&order, &admin, Action::UpdateStatus).is_err());
    }

    #[test]
    fn order_read_is_limited_to_parties() {
        let buyer = caller(UserRole::Buyer);
        let supplier = caller(UserRole::Supplier);
        let stranger = caller(UserRole::Buyer);
        let order = order_between(&buyer, &supplier);

        assert!(order_action(&order, &buyer, Action::Read).is_ok());
        assert!(order_action(&order, &supplier, Action::Read).is_ok());
        assert!(order_action(&order, &stranger, Action::Read).is_err());
    }

    #[test]
    fn payment_verify_requires_order_party() {
        let buyer = caller(UserRole::Buyer);
        let supplier = caller(UserRole::Supplier);
        let stranger = caller(UserRole::Buyer);
        let order = order_between(&buyer, &supplier);

        assert!(payment_action(&order, &buyer, Action::Verify).is_ok());
        assert!(payment_action(&order, &supplier, Action::Verify).is_ok());
        assert!(payment_action(&order, &stranger, Action::Verify).is_err());
    }

    #[test]
    fn inquiry_access_limited_to_parties() {
        let buyer = caller(UserRole::Buyer);
        let supplier = caller(UserRole::Supplier);
        let stranger = caller(UserRole::Buyer);
        let inquiry = inquiries::Model {
            id: Uuid::new_v4(),
            buyer_id: buyer.user_id,
            supplier_id: supplier.user_id,
            product_id: Uuid::new_v4(),
            inquiry_type: "quote".into(),
            message: "MOQ for 50 units?".into(),
            requirements: None,
            status: "pending".into(),
            created_at: Utc::now().into(),
        };

        assert!(inquiry_action(&inquiry, &buyer, Action::Read).is_ok());
        assert!(inquiry_action(&inquiry, &supplier, Action::PostMessage).is_ok());
        assert!(inquiry_action(&inquiry, &stranger, Action::Read).is_err());
    }

    #[test]
    fn supplier_verification_is_admin_only() {
        let supplier = caller(UserRole::Supplier);
        let admin = caller(UserRole::Admin);

        assert!(supplier_profile_action(supplier.user_id, &admin, Action::Verify).is_ok());
        assert!(supplier_profile_action(supplier.user_id, &supplier, Action::Verify).is_err());
        assert!(supplier_profile_action(supplier.user_id, &supplier, Action::Update).is_ok());
        assert!(supplier_profile_action(Uuid::new_v4(), &supplier, Action::Update).is_err());
    }
}
