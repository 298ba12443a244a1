//! 工具输出路由
//!
//! 独立于步骤流水线的 AI 文档，按 (project_id, tool_key) 读写。

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use toolthinker_core::database::dao::tool_output_dao::ToolOutputDao;
use toolthinker_core::errors::api_error::ApiErrorCode;
use toolthinker_core::errors::domain_error::ToolOutputError;
use toolthinker_core::models::project_model::{ToolOutput, UpsertToolOutputRequest};
use toolthinker_services::project_service::{load_owned_project, record_activity};

use crate::auth::require_user;
use crate::error::{ApiFailure, ApiResult};
use crate::state::AppState;

/// GET /api/projects/:id/tools
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<ToolOutput>>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;
    Ok(Json(ToolOutputDao::list_by_project(&conn, &project_id)?))
}

/// PUT /api/projects/:id/tools
pub async fn upsert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(req): Json<UpsertToolOutputRequest>,
) -> ApiResult<Json<ToolOutput>> {
    if req.tool_key.trim().is_empty() {
        return Err(ApiFailure::new(
            ApiErrorCode::ValidationError,
            "tool_key 不能为空",
        ));
    }
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;
    let output = ToolOutputDao::upsert(&conn, &project_id, &req.tool_key, &req.content)?;
    record_activity(&conn, &project_id, "tool.upserted", Some(&req.tool_key));
    Ok(Json(output))
}

/// GET /api/projects/:id/tools/:tool_key
pub async fn get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project_id, tool_key)): Path<(String, String)>,
) -> ApiResult<Json<ToolOutput>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;
    let output = ToolOutputDao::get_by_key(&conn, &project_id, &tool_key)?
        .ok_or(ToolOutputError::NotFound(tool_key))?;
    Ok(Json(output))
}

/// DELETE /api/projects/:id/tools/:tool_key
pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project_id, tool_key)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;
    ToolOutputDao::delete(&conn, &project_id, &tool_key)?;
    Ok(StatusCode::NO_CONTENT)
}
