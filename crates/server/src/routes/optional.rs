//! 可选功能路由：文件夹与提醒
//!
//! 对应的表由独立迁移开通；未开通时 DAO 报 FeatureUnavailable，
//! 映射为 503。

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use toolthinker_core::database::dao::optional_dao::{FolderDao, ReminderDao};
use toolthinker_core::database::schema::migrate_optional_tables;
use toolthinker_core::errors::domain_error::ProjectError;
use toolthinker_core::models::project_model::{Folder, Reminder};
use toolthinker_services::project_service::load_owned_project;

use crate::auth::require_user;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/admin/migrate-optional
///
/// 开通文件夹与提醒的存储，幂等。
pub async fn migrate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let conn = state.db.lock().await;
    require_user(&conn, &headers)?;
    migrate_optional_tables(&conn).map_err(ProjectError::from)?;
    tracing::info!("可选功能表已迁移");
    Ok(Json(json!({"status": "ok"})))
}

// ============================================================================
// 文件夹
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateFolderRequest>,
) -> ApiResult<(StatusCode, Json<Folder>)> {
    if req.name.trim().is_empty() {
        return Err(ProjectError::Validation("文件夹名称不能为空".to_string()).into());
    }
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    let folder = FolderDao::create(&conn, &user.id, req.name.trim())?;
    Ok((StatusCode::CREATED, Json(folder)))
}

/// GET /api/folders
pub async fn list_folders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Folder>>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    Ok(Json(FolderDao::list_by_user(&conn, &user.id)?))
}

/// DELETE /api/folders/:id
pub async fn delete_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(folder_id): Path<String>,
) -> ApiResult<StatusCode> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;

    // DAO 不带所有权语义，这里确认文件夹属于调用者
    let owned = FolderDao::list_by_user(&conn, &user.id)?
        .iter()
        .any(|f| f.id == folder_id);
    if !owned {
        return Err(ProjectError::NotFound(folder_id).into());
    }
    FolderDao::delete(&conn, &folder_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// 提醒
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub message: String,
    pub remind_at: i64,
}

/// POST /api/projects/:id/reminders
pub async fn create_reminder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(req): Json<CreateReminderRequest>,
) -> ApiResult<(StatusCode, Json<Reminder>)> {
    if req.message.trim().is_empty() {
        return Err(ProjectError::Validation("提醒内容不能为空".to_string()).into());
    }
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;
    let reminder = ReminderDao::create(&conn, &project_id, req.message.trim(), req.remind_at)?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

/// GET /api/projects/:id/reminders
pub async fn list_reminders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<Reminder>>> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;
    Ok(Json(ReminderDao::list_by_project(&conn, &project_id)?))
}

/// DELETE /api/projects/:id/reminders/:reminder_id
pub async fn delete_reminder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project_id, reminder_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let conn = state.db.lock().await;
    let user = require_user(&conn, &headers)?;
    load_owned_project(&conn, &project_id, &user.id)?;

    let exists = ReminderDao::list_by_project(&conn, &project_id)?
        .iter()
        .any(|r| r.id == reminder_id);
    if !exists {
        return Err(ProjectError::NotFound(reminder_id).into());
    }
    ReminderDao::delete(&conn, &reminder_id)?;
    Ok(StatusCode::NO_CONTENT)
}
