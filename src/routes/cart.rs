//! Per-user cart endpoints (sales role).
//!
//! Stock is re-checked against the live stock column on every add and only
//! decremented at settlement; nothing is reserved. Two carts may hold the
//! last unit of a product and settlement decides who wins.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{CurrentUser, Role};
use crate::domain::cart::CartLine;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    pub message: &'static str,
    pub line: CartLine,
}

#[derive(sqlx::FromRow)]
struct LineRow {
    id: Uuid,
    product_id: Uuid,
    name: String,
    quantity: i32,
    unit_price: Decimal,
}

impl From<LineRow> for CartLine {
    fn from(r: LineRow) -> Self {
        CartLine::new(r.id, r.product_id, r.name, r.quantity, r.unit_price)
    }
}

pub async fn add_item(
    State(s): State<AppState>,
    user: CurrentUser,
    Json(r): Json<AddItemRequest>,
) -> ApiResult<Json<AddItemResponse>> {
    user.require(Role::Sales)?;
    if r.quantity <= 0 {
        return Err(ApiError::InvalidInput("quantity must be a positive integer".into()));
    }

    // Case-sensitive exact match, per the catalog contract.
    let product: Option<(Uuid, Decimal, i32, String)> = sqlx::query_as(
        "SELECT id, unit_price, stock, status FROM products WHERE name = $1",
    )
    .bind(&r.name)
    .fetch_optional(&s.db)
    .await?;
    let (product_id, unit_price, stock, status) = product.ok_or(ApiError::NotFound("product"))?;

    if status != "available" {
        return Err(ApiError::InvalidInput("product is not available".into()));
    }
    // Checked against live stock only, not cumulative cart quantity.
    if r.quantity > stock {
        return Err(ApiError::InsufficientStock);
    }

    // Atomic increment under the row lock; never read-compute-write.
    let (line_id, quantity): (Uuid, i32) = sqlx::query_as(
        "INSERT INTO cart_items (id, user_id, product_id, quantity, created_at)
         VALUES ($1, $2, $3, $4, NOW())
         ON CONFLICT (user_id, product_id)
         DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
         RETURNING id, quantity",
    )
    .bind(Uuid::now_v7())
    .bind(user.id)
    .bind(product_id)
    .bind(r.quantity)
    .fetch_one(&s.db)
    .await?;

    let message = if quantity == r.quantity {
        "product added to cart"
    } else {
        "cart quantity updated"
    };
    let line = CartLine::new(line_id, product_id, r.name, quantity, unit_price);
    Ok(Json(AddItemResponse { message, line }))
}

pub async fn list_cart(
    State(s): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<CartLine>>> {
    user.require(Role::Sales)?;
    let rows = sqlx::query_as::<_, LineRow>(
        "SELECT ci.id, ci.product_id, p.name, ci.quantity, p.unit_price
         FROM cart_items ci
         JOIN products p ON p.id = ci.product_id
         WHERE ci.user_id = $1
         ORDER BY ci.created_at",
    )
    .bind(user.id)
    .fetch_all(&s.db)
    .await?;

    Ok(Json(rows.into_iter().map(CartLine::from).collect()))
}

pub async fn remove_item(
    State(s): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Role::Sales)?;
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.id)
        .execute(&s.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("cart line"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_cart(State(s): State<AppState>, user: CurrentUser) -> ApiResult<StatusCode> {
    user.require(Role::Sales)?;
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.id)
        .execute(&s.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
