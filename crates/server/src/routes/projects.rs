//! 项目路由
//!
//! 项目 CRUD、活动日志、笔记、标签、复制、导出、对比、
//! 搜索与组合统计。所有 handler 先认证再授权。

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use toolthinker_core::errors::api_error::ApiErrorCode;
use toolthinker_core::models::project_model::{
    ActivityEntry, CreateProjectRequest, Note, Project, ProjectUpdate, Tag,
};
use toolthinker_services::analytics_service::{self, PortfolioSummary};
use toolthinker_services::compare_service::{self, ComparisonReport};
use toolthinker_services::duplicate_service;
use toolthinker_services::export_service::{self, ExportFormat};
use toolthinker_services::project_service;
use toolthinker_services::search_service::{self, SearchResults};

use crate::auth::require_user;
use crate::error::{ApiFailure, ApiResult};
use crate::state::AppState;

// ============================================================================
// 项目 CRUD
// ============================================================================

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Project>>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(project_service::list_projects(&conn, &user.id)?))
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    let project = project_service::create_project(&conn, &user.id, &req)?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id
pub async fn get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Project>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(project_service::get_project(
        &conn,
        &user.id,
        &project_id,
    )?))
}

/// PATCH /api/projects/:id
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(update): Json<ProjectUpdate>,
) -> ApiResult<Json<Project>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(project_service::update_project(
        &conn,
        &user.id,
        &project_id,
        &update,
    )?))
}

/// DELETE /api/projects/:id
pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> ApiResult<StatusCode> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    project_service::delete_project(&conn, &user.id, &project_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_activity_limit")]
    pub limit: usize,
}

fn default_activity_limit() -> usize {
    20
}

/// GET /api/projects/:id/activity
pub async fn activity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<Vec<ActivityEntry>>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(project_service::list_activity(
        &conn,
        &user.id,
        &project_id,
        query.limit,
    )?))
}

// ============================================================================
// 笔记
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub content: String,
}

/// POST /api/projects/:id/notes
pub async fn add_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(req): Json<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    let note = project_service::add_note(&conn, &user.id, &project_id, &req.content)?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/projects/:id/notes
pub async fn list_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<Note>>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(project_service::list_notes(
        &conn,
        &user.id,
        &project_id,
    )?))
}

/// DELETE /api/projects/:id/notes/:note_id
pub async fn delete_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project_id, note_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    project_service::delete_note(&conn, &user.id, &project_id, &note_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// 标签
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddTagRequest {
    pub label: String,
}

/// POST /api/projects/:id/tags
pub async fn add_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(req): Json<AddTagRequest>,
) -> ApiResult<Json<Vec<Tag>>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(project_service::add_tag(
        &conn,
        &user.id,
        &project_id,
        &req.label,
    )?))
}

/// GET /api/projects/:id/tags
pub async fn list_tags(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<Tag>>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(project_service::list_tags(
        &conn,
        &user.id,
        &project_id,
    )?))
}

/// DELETE /api/projects/:id/tags/:label
pub async fn remove_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project_id, label)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    project_service::remove_tag(&conn, &user.id, &project_id, &label)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// 复制 / 导出 / 对比
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DuplicateRequest {
    /// 覆盖默认的 "(Copy)" 后缀命名
    pub name: Option<String>,
}

/// POST /api/projects/:id/duplicate
///
/// 请求体可省略。
pub async fn duplicate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    body: Option<Json<DuplicateRequest>>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    let copy = duplicate_service::duplicate_project(
        &conn,
        &user.id,
        &project_id,
        req.name.as_deref(),
    )?;
    Ok((StatusCode::CREATED, Json(copy)))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default = "default_export_format")]
    pub format: String,
}

fn default_export_format() -> String {
    "markdown".to_string()
}

/// GET /api/projects/:id/export?format=markdown|html|doc
pub async fn export(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let format = ExportFormat::parse(&query.format).ok_or_else(|| {
        ApiFailure::new(
            ApiErrorCode::ValidationError,
            format!("未知的导出格式: {}", query.format),
        )
    })?;

    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    let project = project_service::get_project(&conn, &user.id, &project_id)?;
    let document = export_service::export_project(&conn, &project, format)?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, document.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.filename),
        )
        .body(Body::from(document.body))
        .unwrap_or_else(|e| {
            tracing::error!("构建导出响应失败: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        });
    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub project_ids: Vec<String>,
}

/// POST /api/projects/compare
pub async fn compare(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CompareRequest>,
) -> ApiResult<Json<ComparisonReport>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(compare_service::compare_projects(
        &conn,
        &user.id,
        &req.project_ids,
    )?))
}

// ============================================================================
// 搜索与统计
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResults>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(search_service::search(&conn, &user.id, &query.q)?))
}

/// GET /api/analytics/portfolio
pub async fn portfolio(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<PortfolioSummary>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(analytics_service::portfolio_summary(
        &conn, &user.id,
    )?))
}
