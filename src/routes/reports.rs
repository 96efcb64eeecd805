//! Inventory and sales reports, rendered as PDF over a date range.
//!
//! Ranges are restricted to the current calendar month and never reach into
//! the future; an empty range is a 404, not an empty document.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::{CurrentUser, Role};
use crate::domain::report::{ReportRange, ReportTable};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(sqlx::FromRow)]
struct InventoryRow {
    name: String,
    unit_price: Decimal,
    stock: i32,
    status: String,
}

#[derive(sqlx::FromRow)]
struct SalesReportRow {
    transaction_id: String,
    created_at: DateTime<Utc>,
    payment_method: String,
    total: Decimal,
}

pub async fn inventory_report(
    State(s): State<AppState>,
    user: CurrentUser,
    Query(p): Query<ReportParams>,
) -> ApiResult<impl IntoResponse> {
    user.require(Role::Inventory)?;
    let range = ReportRange::resolve(p.start, p.end, Utc::now().date_naive())?;

    let rows = sqlx::query_as::<_, InventoryRow>(
        "SELECT name, unit_price, stock, status FROM products
         WHERE created_at::date BETWEEN $1 AND $2
         ORDER BY name",
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_all(&s.db)
    .await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound("inventory activity in that period"));
    }

    let table = ReportTable {
        title: "Reporte de Inventario".into(),
        subtitle: range.label(),
        columns: ["Product", "Unit price", "Stock", "Status"],
        rows: rows
            .iter()
            .map(|r| {
                [
                    r.name.clone(),
                    format!("${}", r.unit_price),
                    r.stock.to_string(),
                    r.status.clone(),
                ]
            })
            .collect(),
        summary: Some(("Products listed:".into(), rows.len().to_string())),
    };
    render_pdf(&s, &table, "reporte_inventario.pdf")
}

pub async fn sales_report(
    State(s): State<AppState>,
    user: CurrentUser,
    Query(p): Query<ReportParams>,
) -> ApiResult<impl IntoResponse> {
    user.require(Role::Sales)?;
    let range = ReportRange::resolve(p.start, p.end, Utc::now().date_naive())?;

    let rows = sqlx::query_as::<_, SalesReportRow>(
        "SELECT transaction_id, created_at, payment_method, total FROM sales
         WHERE created_at::date BETWEEN $1 AND $2
         ORDER BY created_at",
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_all(&s.db)
    .await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound("sales in that period"));
    }

    let grand_total: Decimal = rows.iter().map(|r| r.total).sum();
    let table = ReportTable {
        title: "Reporte de Ventas".into(),
        subtitle: range.label(),
        columns: ["Transaction", "Date", "Method", "Total"],
        rows: rows
            .iter()
            .map(|r| {
                [
                    r.transaction_id.clone(),
                    r.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    r.payment_method.clone(),
                    format!("${}", r.total),
                ]
            })
            .collect(),
        summary: Some(("Total sales:".into(), format!("${grand_total}"))),
    };
    render_pdf(&s, &table, "reporte_ventas.pdf")
}

fn render_pdf(
    s: &AppState,
    table: &ReportTable,
    filename: &str,
) -> ApiResult<impl IntoResponse> {
    let bytes = s
        .engine
        .render_report(table)
        .map_err(|e| ApiError::RenderingFailed(e.to_string()))?;
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename={filename}"),
        ),
    ];
    Ok((headers, bytes))
}
