//! 分享链接路由
//!
//! 签发与撤销需要所有者身份；按 token 读取是匿名公开接口。

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use toolthinker_services::share_service::{self, IssuedShareLink, SharedProjectView};

use crate::auth::require_user;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateShareRequest {
    /// 有效期秒数；缺省用服务默认值（7 天）
    #[serde(default)]
    pub ttl_secs: Option<i64>,
}

/// POST /api/projects/:id/share
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(req): Json<CreateShareRequest>,
) -> ApiResult<Json<IssuedShareLink>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(share_service::create_share_link(
        &conn,
        &user.id,
        &project_id,
        req.ttl_secs,
    )?))
}

/// DELETE /api/projects/:id/share
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    let revoked = share_service::revoke_share_links(&conn, &user.id, &project_id)?;
    Ok(Json(json!({"revoked": revoked})))
}

/// GET /api/shared/:token（匿名）
pub async fn resolve(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<SharedProjectView>> {
    let conn = state.db.lock().await;
    Ok(Json(share_service::resolve_share_link(&conn, &token)?))
}
