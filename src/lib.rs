//! Pastelería POS — bakery point-of-sale backend.
//!
//! REST API over PostgreSQL: authentication, product inventory, per-user
//! carts, cash/digital settlement and PDF invoices. The settlement flow is
//! the heart of the crate; see `routes::payments` and `domain::payment`.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod domain;
pub mod error;
pub mod events;
pub mod pdf;
pub mod routes;

use crate::auth::JwtKeys;
use crate::pdf::DocumentEngine;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub nats: Option<async_nats::Client>,
    pub jwt: JwtKeys,
    pub engine: Arc<dyn DocumentEngine>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy", "service": "pasteleria-pos"})) }),
        )
        .route("/api/users/login", post(routes::users::login))
        .route(
            "/api/products",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route(
            "/api/cart",
            get(routes::cart::list_cart).delete(routes::cart::clear_cart),
        )
        .route("/api/cart/items", post(routes::cart::add_item))
        .route("/api/cart/items/:id", delete(routes::cart::remove_item))
        .route("/api/payments/method", post(routes::payments::select_method))
        .route("/api/payments/cash", post(routes::payments::settle_cash))
        .route("/api/payments/digital", post(routes::payments::settle_digital))
        .route("/api/invoices", get(routes::invoices::list_invoices))
        .route("/api/invoices/:id", get(routes::invoices::get_invoice))
        .route("/api/invoices/:id/pdf", get(routes::invoices::invoice_pdf))
        .route("/api/reports/inventory", get(routes::reports::inventory_report))
        .route("/api/reports/sales", get(routes::reports::sales_report))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
