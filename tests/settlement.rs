//! Database-backed settlement tests.
//!
//! These exercise the transactional half of settlement against a real
//! PostgreSQL instance: stock conservation on success and full rollback on
//! failure. They skip themselves when DATABASE_URL is not set.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use pasteleria_pos::auth::{CurrentUser, JwtKeys, Role};
use pasteleria_pos::domain::payment::{plan_cash, plan_digital, PaymentMethod};
use pasteleria_pos::error::ApiError;
use pasteleria_pos::pdf::PdfEngine;
use pasteleria_pos::routes::payments::settle;
use pasteleria_pos::AppState;

async fn state() -> Option<AppState> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping settlement tests");
            return None;
        }
    };
    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&db).await.unwrap();
    Some(AppState {
        db,
        nats: None,
        jwt: JwtKeys::new("settlement-tests", 60),
        engine: Arc::new(PdfEngine),
    })
}

async fn seller(db: &PgPool) -> CurrentUser {
    let id = Uuid::now_v7();
    let username = format!("cajera-{id}");
    sqlx::query("INSERT INTO users (id, username, password_hash, role) VALUES ($1, $2, 'x', 'sales')")
        .bind(id)
        .bind(&username)
        .execute(db)
        .await
        .unwrap();
    CurrentUser { id, username, role: Role::Sales }
}

async fn product(db: &PgPool, unit_price: Decimal, stock: i32) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO products (id, name, unit_price, stock) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(format!("Pan {id}"))
        .bind(unit_price)
        .bind(stock)
        .execute(db)
        .await
        .unwrap();
    id
}

async fn cart_line(db: &PgPool, user_id: Uuid, product_id: Uuid, quantity: i32) {
    sqlx::query("INSERT INTO cart_items (id, user_id, product_id, quantity) VALUES ($1, $2, $3, $4)")
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(db)
        .await
        .unwrap();
}

async fn stock_of(db: &PgPool, product_id: Uuid) -> i32 {
    let (stock,): (i32,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(db)
        .await
        .unwrap();
    stock
}

async fn cart_quantities(db: &PgPool, user_id: Uuid) -> Vec<i32> {
    sqlx::query_as::<_, (i32,)>("SELECT quantity FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(db)
        .await
        .unwrap()
        .into_iter()
        .map(|(q,)| q)
        .collect()
}

async fn sale_count(db: &PgPool, user_id: Uuid) -> i64 {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sales WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await
        .unwrap();
    n
}

#[tokio::test]
async fn cash_settlement_decrements_only_the_sold_product() {
    let Some(s) = state().await else { return };
    let user = seller(&s.db).await;
    let sold = product(&s.db, dec!(3.50), 10).await;
    let bystander = product(&s.db, dec!(1.25), 7).await;
    cart_line(&s.db, user.id, sold, 3).await;

    let sale = settle(&s, &user, |lines| plan_cash(lines, dec!(20.00)))
        .await
        .unwrap();

    assert_eq!(sale.total, dec!(10.50));
    assert_eq!(sale.payment_method, PaymentMethod::Cash);
    assert_eq!(sale.amount_received, Some(dec!(20.00)));
    assert_eq!(sale.change, Some(dec!(9.50)));

    assert_eq!(stock_of(&s.db, sold).await, 7);
    assert_eq!(stock_of(&s.db, bystander).await, 7);
    assert!(cart_quantities(&s.db, user.id).await.is_empty());

    let (total, status): (Decimal, String) =
        sqlx::query_as("SELECT total, status FROM sales WHERE id = $1")
            .bind(sale.id)
            .fetch_one(&s.db)
            .await
            .unwrap();
    assert_eq!(total, dec!(10.50));
    assert_eq!(status, "success");

    let (name, quantity, line_total): (String, i32, Decimal) = sqlx::query_as(
        "SELECT product_name, quantity, line_total FROM sale_items WHERE sale_id = $1",
    )
    .bind(sale.id)
    .fetch_one(&s.db)
    .await
    .unwrap();
    assert_eq!(name, format!("Pan {sold}"));
    assert_eq!(quantity, 3);
    assert_eq!(line_total, dec!(10.50));
}

#[tokio::test]
async fn insufficient_stock_rolls_the_whole_settlement_back() {
    let Some(s) = state().await else { return };
    let user = seller(&s.db).await;
    // Stock sold out from under the cart between add and checkout.
    let scarce = product(&s.db, dec!(18.00), 2).await;
    cart_line(&s.db, user.id, scarce, 5).await;

    let err = settle(&s, &user, |lines| plan_digital(lines, PaymentMethod::Visa))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InsufficientStock));

    assert_eq!(stock_of(&s.db, scarce).await, 2);
    assert_eq!(cart_quantities(&s.db, user.id).await, vec![5]);
    assert_eq!(sale_count(&s.db, user.id).await, 0);
}

#[tokio::test]
async fn insufficient_payment_mutates_nothing() {
    let Some(s) = state().await else { return };
    let user = seller(&s.db).await;
    let bread = product(&s.db, dec!(3.50), 4).await;
    cart_line(&s.db, user.id, bread, 1).await;

    let err = settle(&s, &user, |lines| plan_cash(lines, dec!(2.00)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InsufficientPayment));

    assert_eq!(stock_of(&s.db, bread).await, 4);
    assert_eq!(cart_quantities(&s.db, user.id).await, vec![1]);
    assert_eq!(sale_count(&s.db, user.id).await, 0);
}

#[tokio::test]
async fn an_empty_cart_never_reaches_the_sales_table() {
    let Some(s) = state().await else { return };
    let user = seller(&s.db).await;

    let err = settle(&s, &user, |lines| plan_digital(lines, PaymentMethod::Yappy))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::EmptyCart));
    assert_eq!(sale_count(&s.db, user.id).await, 0);
}
