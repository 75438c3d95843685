use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{AnalyticsSummary, UserList},
        auth::{
            Claims, LoginRequest, LoginResponse, RegisterRequest, SendVerificationRequest,
            UpdateProfileRequest, VerificationChallenge, VerifyRequest,
        },
        inquiries::{
            CreateInquiryRequest, InquiryList, InquiryWithMessages, MessageView,
            PostMessageRequest,
        },
        orders::{CreateOrderRequest, OrderItemInput, OrderList, OrderWithItems,
            UpdateOrderStatusRequest},
        payments::{InitiatePaymentRequest, PaymentList, PaymentWithOrder, VerifyPaymentRequest},
        products::{CategoryList, CreateProductRequest, ProductList, UpdateProductRequest},
        reviews::{CreateReviewRequest, ReviewList, ReviewView},
        suppliers::{SetVerificationRequest, UpsertSupplierRequest},
    },
    models::{
        Inquiry, Message, Order, OrderItem, Payment, Product, Rating, Review, SupplierProfile,
        User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, health, inquiries, orders, params, payments, products, reviews, suppliers},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::send_verification,
        auth::verify,
        auth::me,
        auth::update_profile,
        auth::logout,
        admin::analytics,
        admin::list_users,
        products::list_products,
        products::categories,
        products::my_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        inquiries::create_inquiry,
        inquiries::list_inquiries,
        inquiries::get_inquiry,
        inquiries::post_message,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_status,
        payments::initiate,
        payments::verify,
        payments::history,
        reviews::create_review,
        reviews::list_reviews,
        suppliers::get_profile,
        suppliers::upsert_profile,
        suppliers::set_verification,
    ),
    components(
        schemas(
            User,
            SupplierProfile,
            Product,
            Rating,
            Inquiry,
            Message,
            Order,
            OrderItem,
            Payment,
            Review,
            Claims,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            SendVerificationRequest,
            VerificationChallenge,
            VerifyRequest,
            AnalyticsSummary,
            UserList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CategoryList,
            CreateInquiryRequest,
            PostMessageRequest,
            MessageView,
            InquiryWithMessages,
            InquiryList,
            OrderItemInput,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            InitiatePaymentRequest,
            VerifyPaymentRequest,
            PaymentWithOrder,
            PaymentList,
            CreateReviewRequest,
            ReviewView,
            ReviewList,
            UpsertSupplierRequest,
            SetVerificationRequest,
            params::Pagination,
            params::ProductQuery,
            params::MyProductsQuery,
            params::ReviewQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<InquiryWithMessages>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<PaymentList>,
            ApiResponse<ReviewList>,
            ApiResponse<SupplierProfile>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login, verification, profile"),
        (name = "Admin", description = "Platform aggregates and account listing"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Inquiries", description = "Buyer-supplier inquiry threads"),
        (name = "Orders", description = "Order lifecycle"),
        (name = "Payments", description = "Mock payment records"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Suppliers", description = "Supplier profiles and verification"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
