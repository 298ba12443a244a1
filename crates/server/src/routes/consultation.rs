//! 咨询对话路由
//!
//! 带项目上下文的问答。`stream: true` 时以 SSE 返回增量，
//! 末尾固定一条 `[DONE]` 事件；否则一次性返回完整回复。
//! 消息在持锁阶段组装，补全往返期间不占数据库锁。

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use toolthinker_services::consultation_service::{self, ConsultationRequest};
use toolthinker_services::llm::CompletionClient;
use toolthinker_services::project_service::load_owned_project;

use crate::auth::require_user;
use crate::error::ApiResult;
use crate::sse;
use crate::state::AppState;

/// POST /api/projects/:id/consult
pub async fn consult(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(request): Json<ConsultationRequest>,
) -> ApiResult<Response> {
    let messages = {
        let conn = state.db.lock().await;
        let user = require_user(&conn, &headers)?;
        let project = load_owned_project(&conn, &project_id, &user.id)?;
        consultation_service::prepare_consultation(&conn, &project, &request)?
    };

    if !request.stream {
        let reply = state.completion.complete(&messages).await?;
        return Ok(Json(json!({"reply": reply})).into_response());
    }

    let stream = state.completion.complete_stream(&messages).await?;
    Ok(sse::text_stream_response(stream))
}
