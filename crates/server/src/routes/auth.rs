//! 认证路由

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::json;

use toolthinker_core::models::user_model::{LoginRequest, PasswordResetRequest, RegisterRequest};
use toolthinker_services::auth_service::{self, AuthToken};

use crate::auth::bearer_token;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthToken>> {
    let conn = state.db.lock().await;
    Ok(Json(auth_service::register(&conn, &req)?))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthToken>> {
    let conn = state.db.lock().await;
    Ok(Json(auth_service::login(&conn, &req)?))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let token = bearer_token(&headers)?;
    let conn = state.db.lock().await;
    auth_service::logout(&conn, token)?;
    Ok(Json(json!({"status": "ok"})))
}

/// POST /api/auth/password-reset
///
/// 无论邮箱是否注册都返回成功。
pub async fn password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let conn = state.db.lock().await;
    auth_service::request_password_reset(&conn, state.mailer.as_ref(), &req.email).await?;
    Ok(Json(json!({"status": "ok"})))
}
