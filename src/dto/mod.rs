pub mod admin;
pub mod auth;
pub mod inquiries;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod suppliers;
