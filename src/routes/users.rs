//! Login endpoint.

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
}

pub async fn login(
    State(s): State<AppState>,
    Json(r): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if r.username.trim().is_empty() || r.password.is_empty() {
        return Err(ApiError::InvalidInput(
            "username and password are required".into(),
        ));
    }

    let user = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash, role FROM users WHERE username = $1",
    )
    .bind(&r.username)
    .fetch_optional(&s.db)
    .await?
    // Unknown user and wrong password are indistinguishable to the caller.
    .ok_or(ApiError::Unauthorized)?;

    let parsed = PasswordHash::new(&user.password_hash).map_err(|e| {
        tracing::error!(username = %user.username, error = %e, "stored password hash is malformed");
        ApiError::Unauthorized
    })?;
    Argon2::default()
        .verify_password(r.password.as_bytes(), &parsed)
        .map_err(|_| ApiError::Unauthorized)?;

    let role = match user.role.as_str() {
        "sales" => Role::Sales,
        "inventory" => Role::Inventory,
        "admin" => Role::Admin,
        other => {
            tracing::error!(username = %user.username, role = other, "unknown role in users table");
            return Err(ApiError::Unauthorized);
        }
    };

    let token = s.jwt.issue(user.id, &user.username, role)?;
    tracing::info!(username = %user.username, "login succeeded");
    Ok(Json(LoginResponse { token }))
}
