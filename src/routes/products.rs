//! Product catalog endpoints.
//!
//! Catalog mutation needs the `inventory` role; the sales flow only ever
//! reads products (by exact name, in the cart handlers) and decrements stock
//! inside settlement.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{CurrentUser, Role};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub unit_price: Decimal,
    pub stock: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,
    pub category_id: Option<Uuid>,
    pub unit_price: Decimal,
    // Stock zero is rejected at creation, not merely flagged unavailable.
    #[validate(range(min = 1, message = "stock must be a positive integer"))]
    pub stock: i32,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

pub async fn create_product(
    State(s): State<AppState>,
    user: CurrentUser,
    Json(r): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    user.require(Role::Inventory)?;
    r.validate()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    if r.unit_price <= Decimal::ZERO {
        return Err(ApiError::InvalidInput("unit price must be positive".into()));
    }

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, name, category_id, unit_price, stock, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, 'available', NOW(), NOW())
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(r.name.trim())
    .bind(r.category_id)
    .bind(r.unit_price)
    .bind(r.stock)
    .fetch_one(&s.db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::InvalidInput("a product with that name already exists".into())
        }
        _ => ApiError::Internal(e),
    })?;

    tracing::info!(product = %product.name, stock = product.stock, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    State(s): State<AppState>,
    _user: CurrentUser,
    Query(p): Query<ListParams>,
) -> ApiResult<Json<PaginatedResponse<Product>>> {
    let page = p.page.unwrap_or(1).max(1);
    let limit = p.limit.unwrap_or(20).min(100);

    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products ORDER BY name LIMIT $1 OFFSET $2",
    )
    .bind(limit as i64)
    .bind(super::page_offset(page, limit))
    .fetch_all(&s.db)
    .await?;

    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&s.db)
        .await?;

    Ok(Json(PaginatedResponse { data: products, total, page, limit }))
}
