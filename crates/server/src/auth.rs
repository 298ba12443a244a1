//! bearer token 认证
//!
//! 从 Authorization 头提取 token，交给认证服务换取用户。
//! 缺头、格式不对、token 无效统一报 401。

use axum::http::{header, HeaderMap};
use rusqlite::Connection;

use toolthinker_core::errors::api_error::ApiErrorCode;
use toolthinker_core::models::user_model::User;
use toolthinker_services::auth_service;

use crate::error::ApiFailure;

/// 从请求头提取 bearer token
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiFailure> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiFailure::new(ApiErrorCode::Unauthorized, ""))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiFailure::new(ApiErrorCode::Unauthorized, ""))?;
    Ok(token)
}

/// 校验请求的 bearer token，返回当前用户
pub fn require_user(conn: &Connection, headers: &HeaderMap) -> Result<User, ApiFailure> {
    let token = bearer_token(headers)?;
    auth_service::verify_token(conn, token).map_err(ApiFailure::from)
}
