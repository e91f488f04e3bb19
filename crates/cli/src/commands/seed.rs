//! Demo catalog seeder.
//!
//! Inserts a small set of beverage products so a fresh database has
//! something to put in a cart. Runs the inserts unconditionally, so
//! repeated invocations will create duplicate rows; intended for
//! development databases only.

use cartload_core::Money;
use cartload_server::db;
use rust_decimal::Decimal;
use secrecy::SecretString;

const DEMO_PRODUCTS: [(&str, &str); 4] = [
    ("Sparkling Water 12-pack", "18.00"),
    ("Cold Brew Coffee 6-pack", "27.50"),
    ("Coconut Juice 24-pack", "35.00"),
    ("Ginger Beer 8-pack", "22.00"),
];

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url: SecretString = std::env::var("CARTLOAD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| "missing environment variable: CARTLOAD_DATABASE_URL")?
        .into();

    tracing::info!("Connecting to database");
    let pool = db::create_pool(&database_url).await?;

    for (name, price) in DEMO_PRODUCTS {
        let price_per_case = Money::new(price.parse::<Decimal>()?);
        let product = db::products::insert(&pool, name, price_per_case).await?;
        tracing::info!(
            product_id = product.id.as_i32(),
            name,
            price = %price_per_case,
            "Seeded product"
        );
    }

    tracing::info!("Seeded {} products", DEMO_PRODUCTS.len());
    Ok(())
}
