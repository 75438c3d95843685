use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod doc;
pub mod health;
pub mod inquiries;
pub mod orders;
pub mod params;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod suppliers;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/admin", admin::router())
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/inquiries", inquiries::router())
        .nest("/orders", orders::router())
        .nest("/payments", payments::router())
        .nest("/reviews", reviews::router())
        .nest("/suppliers", suppliers::router())
}
