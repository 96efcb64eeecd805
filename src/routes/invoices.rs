//! Invoice history and PDF generation (sales role).

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{CurrentUser, Role};
use crate::domain::invoice::{InvoiceDocument, InvoiceLine};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SaleHeader {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub total: Decimal,
    pub payment_method: String,
    pub status: String,
    pub transaction_id: String,
}

#[derive(sqlx::FromRow)]
struct SaleRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    total: Decimal,
    payment_method: String,
    status: String,
    transaction_id: String,
    amount_received: Option<Decimal>,
    change: Option<Decimal>,
}

#[derive(sqlx::FromRow)]
struct SaleItemRow {
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub invoices: Vec<SaleHeader>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

pub async fn list_invoices(
    State(s): State<AppState>,
    user: CurrentUser,
    Query(p): Query<HistoryParams>,
) -> ApiResult<Json<HistoryResponse>> {
    user.require(Role::Sales)?;
    let page = p.page.unwrap_or(1).max(1);
    let limit = p.limit.unwrap_or(5).min(100);

    let invoices = sqlx::query_as::<_, SaleHeader>(
        "SELECT id, created_at, total, payment_method, status, transaction_id
         FROM sales ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit as i64)
    .bind(super::page_offset(page, limit))
    .fetch_all(&s.db)
    .await?;

    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sales")
        .fetch_one(&s.db)
        .await?;

    // Explicit message when the history is empty, so the UI can show it.
    let message = invoices.is_empty().then_some("no invoices recorded");
    Ok(Json(HistoryResponse { invoices, total, page, limit, message }))
}

pub async fn get_invoice(
    State(s): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SaleHeader>> {
    user.require(Role::Sales)?;
    sqlx::query_as::<_, SaleHeader>(
        "SELECT id, created_at, total, payment_method, status, transaction_id
         FROM sales WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&s.db)
    .await?
    .map(Json)
    .ok_or(ApiError::NotFound("sale"))
}

/// Loads the sale and its snapshots, renders through the document engine.
/// Engine faults never touch the sale; the caller can simply retry.
pub async fn invoice_pdf(
    State(s): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    user.require(Role::Sales)?;

    let sale = sqlx::query_as::<_, SaleRow>(
        "SELECT id, created_at, total, payment_method, status, transaction_id,
                amount_received, change
         FROM sales WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&s.db)
    .await?
    .ok_or(ApiError::NotFound("sale"))?;

    let items = sqlx::query_as::<_, SaleItemRow>(
        "SELECT product_name, quantity, unit_price, line_total
         FROM sale_items WHERE sale_id = $1 ORDER BY product_name",
    )
    .bind(id)
    .fetch_all(&s.db)
    .await?;

    let document = InvoiceDocument {
        invoice_id: sale.id.to_string(),
        transaction_id: sale.transaction_id,
        issued_at: sale.created_at,
        payment_method: sale.payment_method,
        status: sale.status,
        lines: items
            .into_iter()
            .map(|i| InvoiceLine {
                product_name: i.product_name,
                quantity: i.quantity,
                unit_price: i.unit_price,
                line_total: i.line_total,
            })
            .collect(),
        total: sale.total,
        amount_received: sale.amount_received,
        change: sale.change,
    };

    let bytes = s
        .engine
        .render(&document)
        .map_err(|e| ApiError::RenderingFailed(e.to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=factura_{}.pdf", sale.id),
        ),
    ];
    Ok((headers, bytes))
}
