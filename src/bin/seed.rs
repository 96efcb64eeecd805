//! Seeds demo users, a category and a few products.
//!
//! ```sh
//! DATABASE_URL=postgres://... cargo run --bin seed
//! ```

use anyhow::Result;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};
use rust_decimal_macros::dec;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&std::env::var("DATABASE_URL")?)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    for (username, password, role) in [
        ("admin", "admin123", "admin"),
        ("vendedora", "ventas123", "sales"),
        ("bodeguero", "inventario123", "inventory"),
    ] {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?
            .to_string();
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, role)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(username)
        .bind(hash)
        .bind(role)
        .execute(&db)
        .await?;
        println!("user ready: {username} ({role})");
    }

    let category_id = Uuid::now_v7();
    let (category_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO categories (id, name) VALUES ($1, 'Pan')
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
         RETURNING id",
    )
    .bind(category_id)
    .fetch_one(&db)
    .await?;

    for (name, price, stock) in [
        ("Pan de Masa Madre", dec!(3.50), 100),
        ("Croissant", dec!(1.25), 80),
        ("Torta Alemana", dec!(18.00), 5),
    ] {
        sqlx::query(
            "INSERT INTO products (id, name, category_id, unit_price, stock, status)
             VALUES ($1, $2, $3, $4, $5, 'available')
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(category_id)
        .bind(price)
        .bind(stock)
        .execute(&db)
        .await?;
        println!("product ready: {name}");
    }

    Ok(())
}
