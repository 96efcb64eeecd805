//! Payment selection and settlement (sales role).
//!
//! Settlement converts a cart into a persisted sale in one database
//! transaction: lock the cart lines and their products, validate, decrement
//! stock conditionally, insert the sale with line snapshots, clear the cart.
//! Any failure rolls the whole unit back, so stock is never decremented
//! without a matching sale record.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::auth::{CurrentUser, Role};
use crate::domain::cart::CartLine;
use crate::domain::payment::{plan_cash, plan_digital, PaymentMethod, SettlementPlan};
use crate::error::{ApiError, ApiResult};
use crate::events::{publish_sale_settled, SaleSettled};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SelectMethodRequest {
    pub method: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SelectMethodResponse {
    pub message: &'static str,
    pub method: PaymentMethod,
    /// Cash still needs an amount received before settlement.
    pub requires_amount: bool,
}

#[derive(Debug, Deserialize)]
pub struct CashRequest {
    pub amount_received: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct DigitalRequest {
    pub method: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaleSummary {
    pub id: Uuid,
    pub transaction_id: String,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub status: &'static str,
    pub amount_received: Option<Decimal>,
    pub change: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Records which method the client picked between selection and settlement.
/// Settlement does not require a prior selection; the flow is
/// client-sequenced and both settle endpoints re-validate everything.
pub async fn select_method(
    State(s): State<AppState>,
    user: CurrentUser,
    Json(r): Json<SelectMethodRequest>,
) -> ApiResult<Json<SelectMethodResponse>> {
    user.require(Role::Sales)?;
    let method = PaymentMethod::parse(r.method.as_deref().unwrap_or_default())?;

    sqlx::query(
        "INSERT INTO payment_selections (user_id, method, selected_at)
         VALUES ($1, $2, NOW())
         ON CONFLICT (user_id) DO UPDATE SET method = EXCLUDED.method, selected_at = NOW()",
    )
    .bind(user.id)
    .bind(method.as_str())
    .execute(&s.db)
    .await?;

    let (message, requires_amount) = if method.is_cash() {
        ("cash selected, amount received still required", true)
    } else {
        ("payment method selected", false)
    };
    Ok(Json(SelectMethodResponse { message, method, requires_amount }))
}

pub async fn settle_cash(
    State(s): State<AppState>,
    user: CurrentUser,
    Json(r): Json<CashRequest>,
) -> ApiResult<(StatusCode, Json<SaleSummary>)> {
    user.require(Role::Sales)?;
    if r.amount_received <= Decimal::ZERO {
        return Err(ApiError::InvalidInput("amount received must be positive".into()));
    }
    let sale = settle(&s, &user, |lines| plan_cash(lines, r.amount_received)).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn settle_digital(
    State(s): State<AppState>,
    user: CurrentUser,
    Json(r): Json<DigitalRequest>,
) -> ApiResult<(StatusCode, Json<SaleSummary>)> {
    user.require(Role::Sales)?;
    let method = PaymentMethod::parse(r.method.as_deref().unwrap_or_default())?;
    // The external gateway is a trusted collaborator assumed to succeed;
    // no call is made here.
    let sale = settle(&s, &user, |lines| plan_digital(lines, method)).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// Shared settlement sequence. The plan closure is pure; everything else is
/// one transactional unit.
pub async fn settle<F>(s: &AppState, user: &CurrentUser, plan: F) -> ApiResult<SaleSummary>
where
    F: FnOnce(&[CartLine]) -> Result<SettlementPlan, ApiError>,
{
    let mut tx = s.db.begin().await?;

    let lines = lock_cart_lines(&mut tx, user.id).await?;
    // Validation failures roll back before any mutation; cart and stock
    // stay exactly as they were.
    let plan = plan(&lines)?;

    for line in &lines {
        let updated = sqlx::query(
            "UPDATE products SET stock = stock - $2, updated_at = NOW()
             WHERE id = $1 AND stock >= $2",
        )
        .bind(line.product_id)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;
        // The condition serializes concurrent settlements on the same
        // product: the loser of the race lands here and rolls back.
        if updated.rows_affected() == 0 {
            return Err(ApiError::InsufficientStock);
        }
    }

    let sale_id = Uuid::now_v7();
    let transaction_id = format!("TXN-{:08}", rand::random::<u32>());
    let (created_at,): (DateTime<Utc>,) = sqlx::query_as(
        "INSERT INTO sales (id, user_id, created_at, total, payment_method, status,
                            transaction_id, amount_received, change)
         VALUES ($1, $2, NOW(), $3, $4, 'success', $5, $6, $7)
         RETURNING created_at",
    )
    .bind(sale_id)
    .bind(user.id)
    .bind(plan.total)
    .bind(plan.method.as_str())
    .bind(&transaction_id)
    .bind(plan.amount_received)
    .bind(plan.change)
    .fetch_one(&mut *tx)
    .await?;

    // Snapshot the lines so the invoice survives later price changes.
    for line in &lines {
        sqlx::query(
            "INSERT INTO sale_items (id, sale_id, product_name, quantity, unit_price, line_total)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::now_v7())
        .bind(sale_id)
        .bind(&line.name)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.total)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM payment_selections WHERE user_id = $1")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        sale_id = %sale_id,
        transaction_id = %transaction_id,
        method = plan.method.as_str(),
        total = %plan.total,
        "sale settled"
    );
    publish_sale_settled(
        &s.nats,
        SaleSettled {
            sale_id,
            user_id: user.id,
            transaction_id: transaction_id.clone(),
            payment_method: plan.method.as_str().to_string(),
            total: plan.total,
        },
    )
    .await;

    Ok(SaleSummary {
        id: sale_id,
        transaction_id,
        total: plan.total,
        payment_method: plan.method,
        status: "success",
        amount_received: plan.amount_received,
        change: plan.change,
        created_at,
    })
}

async fn lock_cart_lines(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> ApiResult<Vec<CartLine>> {
    let rows: Vec<(Uuid, Uuid, String, i32, Decimal)> = sqlx::query_as(
        "SELECT ci.id, ci.product_id, p.name, ci.quantity, p.unit_price
         FROM cart_items ci
         JOIN products p ON p.id = ci.product_id
         WHERE ci.user_id = $1
         ORDER BY ci.created_at
         FOR UPDATE",
    )
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, product_id, name, quantity, unit_price)| {
            CartLine::new(id, product_id, name, quantity, unit_price)
        })
        .collect())
}
