use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use seekfactory_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@seekfactory.test", "admin123!", "admin").await?;
    let buyer_id = ensure_user(&pool, "buyer@seekfactory.test", "buyer123!", "buyer").await?;
    let supplier_id =
        ensure_user(&pool, "supplier@seekfactory.test", "supplier123!", "supplier").await?;
    seed_products(&pool, supplier_id).await?;

    println!(
        "Seed completed. Admin: {admin_id}, Buyer: {buyer_id}, Supplier: {supplier_id}"
    );
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role, verified)
        VALUES ($1, $2, $3, $4, TRUE)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool, supplier_id: Uuid) -> anyhow::Result<()> {
    let products = vec![
        (
            "CNC Lathe TX-200",
            "Compact precision lathe for small-batch turning",
            "Manufacturing",
            "$8,000-12,000",
        ),
        (
            "Injection Molding Machine IM-90",
            "90-ton clamping force, servo-driven",
            "Plastics",
            "$25,000-30,000",
        ),
        (
            "Industrial Food Mixer FM-50",
            "50L planetary mixer, stainless bowl",
            "Food Processing",
            "$1,500-2,500",
        ),
        (
            "Laser Cutter LC-1390",
            "130W CO2 laser, 1300x900mm bed",
            "Manufacturing",
            "$4,000-6,000",
        ),
    ];

    for (name, desc, category, price_range) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, supplier_id, name, description, category, price_range, status)
            SELECT $1, $2, $3, $4, $5, $6, 'active'
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(supplier_id)
        .bind(name)
        .bind(desc)
        .bind(category)
        .bind(price_range)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
