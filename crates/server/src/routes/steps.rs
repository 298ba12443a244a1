//! 工作流步骤路由
//!
//! 步骤的惰性创建、输入写入、用户编辑输出、完成与 AI 生成。
//! 所有权先由项目服务校验，步骤服务只管步骤语义。

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use toolthinker_services::generation_service;
use toolthinker_services::project_service::load_owned_project;
use toolthinker_services::step_service::{self, StepDetail};

use crate::auth::require_user;
use crate::error::ApiResult;
use crate::sse;
use crate::state::AppState;

/// GET /api/projects/:id/steps
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<StepDetail>>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;
    Ok(Json(step_service::list_steps(&conn, &project_id)?))
}

/// GET /api/projects/:id/steps/:step_key
///
/// 不存在时创建，幂等。
pub async fn get_or_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project_id, step_key)): Path<(String, String)>,
) -> ApiResult<Json<StepDetail>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;
    Ok(Json(step_service::get_or_create_step(
        &conn,
        &project_id,
        &step_key,
    )?))
}

/// PUT /api/projects/:id/steps/:step_key/inputs
///
/// 整条替换步骤输入。
pub async fn update_inputs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project_id, step_key)): Path<(String, String)>,
    Json(data): Json<HashMap<String, Value>>,
) -> ApiResult<Json<StepDetail>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;
    Ok(Json(step_service::update_inputs(
        &conn,
        &project_id,
        &step_key,
        &data,
    )?))
}

/// PUT /api/projects/:id/steps/:step_key/output
///
/// 写入用户编辑版输出，AI 版原样保留。
pub async fn set_user_output(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project_id, step_key)): Path<(String, String)>,
    Json(edited): Json<Value>,
) -> ApiResult<Json<StepDetail>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;
    Ok(Json(step_service::set_user_edited_output(
        &conn,
        &project_id,
        &step_key,
        &edited,
    )?))
}

/// POST /api/projects/:id/steps/:step_key/complete
pub async fn complete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project_id, step_key)): Path<(String, String)>,
) -> ApiResult<Json<StepDetail>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;
    Ok(Json(step_service::complete_step(
        &conn,
        &project_id,
        &step_key,
    )?))
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    #[serde(default)]
    stream: bool,
}

/// POST /api/projects/:id/steps/:step_key/generate
///
/// 调用补全客户端生成步骤输出；重新生成递增 version
/// 并清空用户编辑版。`?stream=true` 时以 SSE 原样转发
/// 补全文本，不校验 JSON 也不落库。
///
/// 补全往返期间不持数据库锁，结束后重新加锁落库。
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project_id, step_key)): Path<(String, String)>,
    Query(query): Query<GenerateQuery>,
) -> ApiResult<Response> {
    let pending = {
        let conn = state.db.lock().await;
        let user = require_user(&conn, &headers)?;
        load_owned_project(&conn, &project_id, &user.id)?;
        generation_service::prepare_generation(&conn, &project_id, &step_key)?
    };

    if query.stream {
        let stream =
            generation_service::stream_generation(state.completion.as_ref(), &pending).await?;
        return Ok(sse::text_stream_response(stream));
    }

    let value = generation_service::run_generation(state.completion.as_ref(), &pending).await?;
    let conn = state.db.lock().await;
    let output = generation_service::persist_generation(&conn, &pending, &value)?;
    Ok(Json(output).into_response())
}
