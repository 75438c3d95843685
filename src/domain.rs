use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Roles a user can hold. Stored as text, parsed at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Buyer,
    Supplier,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Buyer => "buyer",
            UserRole::Supplier => "supplier",
            UserRole::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(UserRole::Buyer),
            "supplier" => Ok(UserRole::Supplier),
            "admin" => Ok(UserRole::Admin),
            other => Err(AppError::BadRequest(format!("Unknown role: {other}"))),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    Draft,
    Pending,
    Active,
    Inactive,
    Rejected,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Pending => "pending",
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProductStatus::Draft),
            "pending" => Ok(ProductStatus::Pending),
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            "rejected" => Ok(ProductStatus::Rejected),
            other => Err(AppError::BadRequest(format!(
                "Unknown product status: {other}"
            ))),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InquiryStatus {
    Pending,
    Responded,
    Closed,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::Pending => "pending",
            InquiryStatus::Responded => "responded",
            InquiryStatus::Closed => "closed",
        }
    }
}

/// Order lifecycle. The table replaces the free-form status strings of the
/// original data model: a transition not listed here is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Shipped)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Shipped, Cancelled)
        )
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(AppError::BadRequest(format!(
                "Unknown order status: {other}"
            ))),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Initiated,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Initiated => "initiated",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Initiated, Completed) | (Initiated, Failed) | (Completed, Refunded)
        )
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initiated" => Ok(PaymentStatus::Initiated),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(AppError::BadRequest(format!(
                "Unknown payment status: {other}"
            ))),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_happy_path_is_allowed() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn order_cancellation_allowed_before_delivery_only() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn order_terminal_states_have_no_exits() {
        use OrderStatus::*;
        for next in [Pending, Confirmed, Shipped, Delivered, Cancelled] {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn order_skipping_states_is_rejected() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Confirmed.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Confirmed));
    }

    #[test]
    fn payment_transitions() {
        use PaymentStatus::*;
        assert!(Initiated.can_transition_to(Completed));
        assert!(Initiated.can_transition_to(Failed));
        assert!(Completed.can_transition_to(Refunded));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Refunded.can_transition_to(Initiated));
    }

    #[test]
    fn statuses_round_trip_through_strings() {
        for status in ["pending", "confirmed", "shipped", "delivered", "cancelled"] {
            assert_eq!(status.parse::<OrderStatus>().unwrap().as_str(), status);
        }
        assert!("paid".parse::<OrderStatus>().is_err());
        assert!("verified".parse::<PaymentStatus>().is_err());
        assert!("superadmin".parse::<UserRole>().is_err());
    }
}
