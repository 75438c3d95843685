pub mod audit_logs;
pub mod inquiries;
pub mod messages;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod supplier_profiles;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use inquiries::Entity as Inquiries;
pub use messages::Entity as Messages;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use supplier_profiles::Entity as SupplierProfiles;
pub use users::Entity as Users;
