use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, Statement};
use uuid::Uuid;

use seekfactory_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    domain::UserRole,
    dto::{
        auth::{Claims, LoginRequest, RegisterRequest, SendVerificationRequest, VerifyRequest},
        inquiries::{CreateInquiryRequest, PostMessageRequest},
        orders::{CreateOrderRequest, OrderItemInput, UpdateOrderStatusRequest},
        payments::{InitiatePaymentRequest, VerifyPaymentRequest},
        products::{CreateProductRequest, UpdateProductRequest},
        reviews::CreateReviewRequest,
        suppliers::{SetVerificationRequest, UpsertSupplierRequest},
    },
    entity::{products::Entity as Products, users::ActiveModel as UserActive},
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::{Pagination, ProductQuery},
    services::{
        admin_service, auth_service, inquiry_service, order_service, payment_service,
        product_service, review_service, supplier_service,
    },
    state::AppState,
};

// Full marketplace flow: register/login, publish a product, inquiry thread,
// order lifecycle, mock payment, review, supplier verification.
#[tokio::test]
async fn marketplace_end_to_end_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    if std::env::var("JWT_SECRET").is_err() {
        unsafe { std::env::set_var("JWT_SECRET", "integration-test-secret") };
    }

    let state = setup_state(&database_url).await?;

    // --- Registration and login ---

    let buyer = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "buyer@example.com".into(),
            phone: Some("+86-555-0001".into()),
            password: "buyer-password".into(),
            role: "buyer".into(),
            business_details: None,
        },
    )
    .await?
    .data
    .unwrap();

    let supplier = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "supplier@example.com".into(),
            phone: None,
            password: "supplier-password".into(),
            role: "supplier".into(),
            business_details: Some("Machinery exporter".into()),
        },
    )
    .await?
    .data
    .unwrap();

    let stranger = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "other-buyer@example.com".into(),
            phone: None,
            password: "other-password".into(),
            role: "buyer".into(),
            business_details: None,
        },
    )
    .await?
    .data
    .unwrap();

    // Registering as admin is rejected outright.
    let admin_attempt = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "sneaky@example.com".into(),
            phone: None,
            password: "admin-password".into(),
            role: "admin".into(),
            business_details: None,
        },
    )
    .await;
    assert!(matches!(admin_attempt, Err(AppError::Validation(_))));

    // Duplicate email conflicts.
    let dup = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "buyer@example.com".into(),
            phone: None,
            password: "another-password".into(),
            role: "buyer".into(),
            business_details: None,
        },
    )
    .await;
    assert!(matches!(dup, Err(AppError::Conflict(_))));

    // Login by email; the token claims round-trip to the stored user.
    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: Some("buyer@example.com".into()),
            phone: None,
            password: "buyer-password".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let secret = std::env::var("JWT_SECRET")?;
    let claims = decode::<Claims>(
        &login.token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?
    .claims;
    assert_eq!(claims.sub, buyer.id.to_string());
    assert_eq!(claims.role, "buyer");

    let bad_login = auth_service::login_user(
        &state,
        LoginRequest {
            email: Some("buyer@example.com".into()),
            phone: None,
            password: "wrong-password".into(),
        },
    )
    .await;
    assert!(matches!(bad_login, Err(AppError::Unauthorized(_))));

    // --- Verification challenges ---

    let challenge = auth_service::send_verification(
        &state,
        SendVerificationRequest {
            email: Some("supplier@example.com".into()),
            phone: None,
            kind: "email".into(),
        },
    )
    .await?
    .data
    .unwrap();
    let token = challenge.token.expect("email token");
    assert_eq!(token.len(), 32);

    let wrong_token = auth_service::verify_user(
        &state,
        VerifyRequest {
            email: Some("supplier@example.com".into()),
            phone: None,
            token: Some("not-the-token".into()),
            code: None,
        },
    )
    .await;
    assert!(matches!(wrong_token, Err(AppError::BadRequest(_))));

    let verified_supplier = auth_service::verify_user(
        &state,
        VerifyRequest {
            email: Some("supplier@example.com".into()),
            phone: None,
            token: Some(token.clone()),
            code: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(verified_supplier.verified);

    // The token is cleared on use.
    let replay = auth_service::verify_user(
        &state,
        VerifyRequest {
            email: Some("supplier@example.com".into()),
            phone: None,
            token: Some(token),
            code: None,
        },
    )
    .await;
    assert!(matches!(replay, Err(AppError::BadRequest(_))));

    let challenge = auth_service::send_verification(
        &state,
        SendVerificationRequest {
            email: None,
            phone: Some("+86-555-0001".into()),
            kind: "phone".into(),
        },
    )
    .await?
    .data
    .unwrap();
    let code = challenge.code.expect("phone code");
    assert_eq!(code.len(), 6);

    let verified_buyer = auth_service::verify_user(
        &state,
        VerifyRequest {
            email: None,
            phone: Some("+86-555-0001".into()),
            token: None,
            code: Some(code),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(verified_buyer.verified);

    let admin_id = create_admin(&state, "admin@example.com").await?;

    let auth_buyer = auth_user(buyer.id, "buyer@example.com", UserRole::Buyer);
    let auth_supplier = auth_user(supplier.id, "supplier@example.com", UserRole::Supplier);
    let auth_stranger = auth_user(stranger.id, "other-buyer@example.com", UserRole::Buyer);
    let auth_admin = auth_user(admin_id, "admin@example.com", UserRole::Admin);

    // --- Catalog: submission, moderation, public visibility ---

    let product = product_service::create_product(
        &state,
        &auth_supplier,
        CreateProductRequest {
            name: "CNC Lathe TX-200".into(),
            description: "Horizontal CNC lathe for precision turning".into(),
            category: "machining".into(),
            price_range: Some("$40,000 - $55,000".into()),
            base_price: Some(4_000_000),
            currency: Some("USD".into()),
            min_order_quantity: Some(1),
            country_of_origin: Some("CN".into()),
            tags: Some(vec!["cnc".into(), "lathe".into()]),
            certifications: Some("CE, ISO 9001".into()),
            images: None,
            status: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(product.status, "pending");

    // Buyers cannot create products.
    let forbidden = product_service::create_product(
        &state,
        &auth_buyer,
        CreateProductRequest {
            name: "Nope".into(),
            description: "Nope".into(),
            category: "nope".into(),
            price_range: None,
            base_price: None,
            currency: None,
            min_order_quantity: None,
            country_of_origin: None,
            tags: None,
            certifications: None,
            images: None,
            status: None,
        },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden(_))));

    // Pending products stay out of the public listing.
    let listing = product_service::list_products(&state, public_query(None)).await?;
    assert!(listing.data.unwrap().items.is_empty());

    // The owner cannot self-approve.
    let self_approve = product_service::update_product(
        &state,
        &auth_supplier,
        product.id,
        status_update("active"),
    )
    .await;
    assert!(matches!(self_approve, Err(AppError::Forbidden(_))));

    product_service::update_product(&state, &auth_admin, product.id, status_update("active"))
        .await?;

    let listing = product_service::list_products(&state, public_query(None)).await?;
    let items = listing.data.unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, product.id);

    // Search matches tags too.
    let by_tag = product_service::list_products(&state, public_query(Some("lathe"))).await?;
    assert_eq!(by_tag.data.unwrap().items.len(), 1);
    let no_match = product_service::list_products(&state, public_query(Some("excavator"))).await?;
    assert!(no_match.data.unwrap().items.is_empty());

    // --- Inquiry thread: both parties, nobody else ---

    let inquiry = inquiry_service::create_inquiry(
        &state,
        &auth_buyer,
        CreateInquiryRequest {
            product_id: product.id,
            supplier_id: supplier.id,
            inquiry_type: "quote".into(),
            message: "What is the lead time for 2 units?".into(),
            requirements: Some("Voltage 380V".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(inquiry.status, "pending");

    inquiry_service::post_message(
        &state,
        &auth_supplier,
        inquiry.id,
        PostMessageRequest {
            content: "Lead time is 6 weeks.".into(),
        },
    )
    .await?;

    let thread = inquiry_service::get_inquiry(&state, &auth_supplier, inquiry.id)
        .await?
        .data
        .unwrap();
    assert_eq!(thread.inquiry.message, "What is the lead time for 2 units?");
    assert_eq!(thread.messages.len(), 1);
    assert_eq!(
        thread.messages[0].sender_email.as_deref(),
        Some("supplier@example.com")
    );
    assert_eq!(thread.messages[0].sender_role.as_deref(), Some("supplier"));

    let outsider = inquiry_service::get_inquiry(&state, &auth_stranger, inquiry.id).await;
    assert!(matches!(outsider, Err(AppError::Forbidden(_))));
    let outsider_post = inquiry_service::post_message(
        &state,
        &auth_stranger,
        inquiry.id,
        PostMessageRequest {
            content: "Let me in".into(),
        },
    )
    .await;
    assert!(matches!(outsider_post, Err(AppError::Forbidden(_))));

    // --- Order lifecycle ---

    let order = order_service::create_order(
        &state,
        &auth_buyer,
        CreateOrderRequest {
            supplier_id: supplier.id,
            products: vec![OrderItemInput {
                product_id: product.id,
                quantity: 2,
                unit_price: 4_000_000,
                specifications: Some("380V spindle".into()),
            }],
            shipping_address: "12 Harbour Rd, Rotterdam".into(),
            total_amount: 8_000_000,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(order.order.status, "pending");
    assert_eq!(order.items.len(), 1);

    // Status moves one step at a time.
    let skip = order_service::update_status(
        &state,
        &auth_supplier,
        order.order.id,
        UpdateOrderStatusRequest {
            status: "delivered".into(),
        },
    )
    .await;
    assert!(matches!(skip, Err(AppError::BadRequest(_))));

    // Only the supplier drives the status, not the buyer and not an admin.
    for caller in [&auth_buyer, &auth_admin] {
        let denied = order_service::update_status(
            &state,
            caller,
            order.order.id,
            UpdateOrderStatusRequest {
                status: "confirmed".into(),
            },
        )
        .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    for next in ["confirmed", "shipped", "delivered"] {
        let updated = order_service::update_status(
            &state,
            &auth_supplier,
            order.order.id,
            UpdateOrderStatusRequest {
                status: next.into(),
            },
        )
        .await?
        .data
        .unwrap();
        assert_eq!(updated.status, next);
    }

    // Delivered is terminal.
    let cancel = order_service::update_status(
        &state,
        &auth_supplier,
        order.order.id,
        UpdateOrderStatusRequest {
            status: "cancelled".into(),
        },
    )
    .await;
    assert!(matches!(cancel, Err(AppError::BadRequest(_))));

    let visible = order_service::get_order(&state, &auth_buyer, order.order.id).await?;
    assert_eq!(visible.data.unwrap().order.status, "delivered");
    let hidden = order_service::get_order(&state, &auth_stranger, order.order.id).await;
    assert!(matches!(hidden, Err(AppError::Forbidden(_))));

    // --- Mock payment ---

    let payment = payment_service::initiate_payment(
        &state,
        &auth_buyer,
        InitiatePaymentRequest {
            order_id: order.order.id,
            amount: 8_000_000,
            currency: "USD".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(payment.status, "initiated");

    let outsider_verify = payment_service::verify_payment(
        &state,
        &auth_stranger,
        VerifyPaymentRequest {
            payment_id: payment.id,
            status: "completed".into(),
        },
    )
    .await;
    assert!(matches!(outsider_verify, Err(AppError::Forbidden(_))));

    let verified = payment_service::verify_payment(
        &state,
        &auth_buyer,
        VerifyPaymentRequest {
            payment_id: payment.id,
            status: "completed".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(verified.status, "completed");

    let repeat = payment_service::verify_payment(
        &state,
        &auth_buyer,
        VerifyPaymentRequest {
            payment_id: payment.id,
            status: "completed".into(),
        },
    )
    .await;
    assert!(matches!(repeat, Err(AppError::BadRequest(_))));

    let history = payment_service::payment_history(&state, &auth_buyer)
        .await?
        .data
        .unwrap();
    assert_eq!(history.items.len(), 1);
    assert!(history.items[0].order.is_some());

    // --- Review after delivery ---

    let early = review_service::create_review(
        &state,
        &auth_stranger,
        CreateReviewRequest {
            product_id: product.id,
            order_id: order.order.id,
            rating: 5,
            comment: "Never bought this".into(),
        },
    )
    .await;
    assert!(matches!(early, Err(AppError::Forbidden(_))));

    review_service::create_review(
        &state,
        &auth_buyer,
        CreateReviewRequest {
            product_id: product.id,
            order_id: order.order.id,
            rating: 5,
            comment: "Excellent build quality.".into(),
        },
    )
    .await?;

    let stored = Products::find_by_id(product.id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(stored.rating_count, 1);
    assert!((stored.rating_average - 5.0).abs() < f64::EPSILON);

    let duplicate = review_service::create_review(
        &state,
        &auth_buyer,
        CreateReviewRequest {
            product_id: product.id,
            order_id: order.order.id,
            rating: 4,
            comment: "Second thoughts".into(),
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let reviews = review_service::list_reviews(&state, product.id)
        .await?
        .data
        .unwrap();
    assert_eq!(reviews.reviews.len(), 1);
    assert!((reviews.avg_rating - 5.0).abs() < f64::EPSILON);

    // --- Supplier profile and verification flags ---

    supplier_service::upsert_profile(
        &state,
        &auth_supplier,
        UpsertSupplierRequest {
            company_name: "Shenzhen Precision Machinery".into(),
            description: "CNC machine tools since 2004".into(),
            established_year: Some(2004),
            city: Some("Shenzhen".into()),
            province: Some("Guangdong".into()),
            country: Some("CN".into()),
            certifications: Some("ISO 9001".into()),
            business_license: None,
            contact_info: Some("sales@szpm.example".into()),
        },
    )
    .await?;

    let denied = supplier_service::set_verification(
        &state,
        &auth_buyer,
        supplier.id,
        SetVerificationRequest {
            email_verified: Some(true),
            phone_verified: None,
            business_verified: None,
        },
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let profile = supplier_service::set_verification(
        &state,
        &auth_admin,
        supplier.id,
        SetVerificationRequest {
            email_verified: Some(true),
            phone_verified: None,
            business_verified: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(profile.email_verified);
    assert!(!profile.phone_verified);
    assert!(!profile.business_verified);

    // An omitted flag keeps its stored value.
    let profile = supplier_service::set_verification(
        &state,
        &auth_admin,
        supplier.id,
        SetVerificationRequest {
            email_verified: None,
            phone_verified: None,
            business_verified: Some(true),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(profile.email_verified);
    assert!(profile.business_verified);

    // --- Admin aggregates ---

    let denied = admin_service::analytics(&state, &auth_buyer).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let summary = admin_service::analytics(&state, &auth_admin)
        .await?
        .data
        .unwrap();
    assert_eq!(summary.total_users, 4);
    assert_eq!(summary.active_suppliers, 1);
    assert_eq!(summary.total_orders, 1);
    assert_eq!(summary.gross_merchandise_value, 8_000_000);
    assert_eq!(summary.average_order_value, 8_000_000);

    let accounts = admin_service::list_users(&state, &auth_admin)
        .await?
        .data
        .unwrap();
    assert_eq!(accounts.items.len(), 4);
    assert!(
        accounts
            .items
            .iter()
            .any(|u| u.email == "buyer@example.com")
    );

    // --- Soft delete hides the product from the public listing ---

    product_service::delete_product(&state, &auth_supplier, product.id).await?;
    let listing = product_service::list_products(&state, public_query(None)).await?;
    assert!(listing.data.unwrap().items.is_empty());

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE reviews, payments, order_items, orders, messages, inquiries, \
         products, supplier_profiles, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

// Admins are seeded out of band, never registered through the API.
async fn create_admin(state: &AppState, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        phone: Set(None),
        password_hash: Set(auth_service::hash_password("admin-password")?),
        role: Set("admin".into()),
        verified: Set(true),
        business_details: Set(None),
        email_verification_token: Set(None),
        email_verification_token_expires: Set(None),
        phone_verification_code: Set(None),
        phone_verification_code_expires: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

fn auth_user(user_id: Uuid, email: &str, role: UserRole) -> AuthUser {
    AuthUser {
        user_id,
        email: email.to_string(),
        phone: None,
        role,
    }
}

fn public_query(search: Option<&str>) -> ProductQuery {
    ProductQuery {
        pagination: Pagination {
            page: None,
            per_page: None,
        },
        category: None,
        search: search.map(str::to_string),
        min_price: None,
        max_price: None,
        country: None,
        status: None,
    }
}

fn status_update(status: &str) -> UpdateProductRequest {
    UpdateProductRequest {
        name: None,
        description: None,
        category: None,
        price_range: None,
        base_price: None,
        currency: None,
        min_order_quantity: None,
        country_of_origin: None,
        tags: None,
        certifications: None,
        images: None,
        status: Some(status.to_string()),
    }
}
