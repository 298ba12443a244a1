//! 项目服务
//!
//! 项目 CRUD 与附属资源（笔记、标签）的业务入口。
//! 所有权校验统一走 `load_owned_project`，活动日志尽力而为。

use rusqlite::Connection;
use tracing::warn;

use toolthinker_core::database::dao::activity_dao::ActivityDao;
use toolthinker_core::database::dao::note_dao::NoteDao;
use toolthinker_core::database::dao::project_dao::ProjectDao;
use toolthinker_core::database::dao::tag_dao::TagDao;
use toolthinker_core::errors::domain_error::ProjectError;
use toolthinker_core::models::project_model::{
    ActivityEntry, CreateProjectRequest, Note, Project, ProjectUpdate, Tag,
};
use toolthinker_core::models::Owned;

/// 加载项目并校验所有权
///
/// 项目不存在返回 NotFound，属于他人返回 Forbidden。
/// 存在性检查在前，避免把"别人的项目"误报成不存在。
pub fn load_owned_project(
    conn: &Connection,
    project_id: &str,
    user_id: &str,
) -> Result<Project, ProjectError> {
    let project = ProjectDao::get(conn, project_id)?
        .ok_or_else(|| ProjectError::NotFound(project_id.to_string()))?;
    if project.owner_id() != user_id {
        return Err(ProjectError::Forbidden(project_id.to_string()));
    }
    Ok(project)
}

/// 尽力而为地写活动日志；失败只告警，不向上传播
pub fn record_activity(conn: &Connection, project_id: &str, action: &str, detail: Option<&str>) {
    if let Err(e) = ActivityDao::append(conn, project_id, action, detail) {
        warn!("活动日志写入失败 ({project_id}/{action}): {e}");
    }
}

/// 创建项目
pub fn create_project(
    conn: &Connection,
    user_id: &str,
    req: &CreateProjectRequest,
) -> Result<Project, ProjectError> {
    if req.name.trim().is_empty() {
        return Err(ProjectError::Validation("项目名称不能为空".to_string()));
    }
    let project = ProjectDao::create(conn, user_id, req)?;
    record_activity(conn, &project.id, "project.created", None);
    Ok(project)
}

/// 用户的项目列表
pub fn list_projects(conn: &Connection, user_id: &str) -> Result<Vec<Project>, ProjectError> {
    ProjectDao::list_by_user(conn, user_id)
}

/// 获取单个项目
pub fn get_project(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
) -> Result<Project, ProjectError> {
    load_owned_project(conn, project_id, user_id)
}

/// 更新项目
pub fn update_project(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
    update: &ProjectUpdate,
) -> Result<Project, ProjectError> {
    load_owned_project(conn, project_id, user_id)?;
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(ProjectError::Validation("项目名称不能为空".to_string()));
        }
    }
    let project = ProjectDao::update(conn, project_id, update)?;
    record_activity(conn, project_id, "project.updated", None);
    Ok(project)
}

/// 删除项目（级联删除步骤与附属记录）
pub fn delete_project(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
) -> Result<(), ProjectError> {
    load_owned_project(conn, project_id, user_id)?;
    ProjectDao::delete(conn, project_id)
}

/// 项目的最近活动
pub fn list_activity(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
    limit: usize,
) -> Result<Vec<ActivityEntry>, ProjectError> {
    load_owned_project(conn, project_id, user_id)?;
    ActivityDao::list_recent(conn, project_id, limit)
}

// ============================================================================
// 笔记
// ============================================================================

/// 添加笔记
pub fn add_note(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
    content: &str,
) -> Result<Note, ProjectError> {
    if content.trim().is_empty() {
        return Err(ProjectError::Validation("笔记内容不能为空".to_string()));
    }
    load_owned_project(conn, project_id, user_id)?;
    let note = NoteDao::create(conn, project_id, content)?;
    record_activity(conn, project_id, "note.created", None);
    Ok(note)
}

/// 项目的全部笔记
pub fn list_notes(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
) -> Result<Vec<Note>, ProjectError> {
    load_owned_project(conn, project_id, user_id)?;
    NoteDao::list_by_project(conn, project_id)
}

/// 删除笔记
pub fn delete_note(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
    note_id: &str,
) -> Result<(), ProjectError> {
    load_owned_project(conn, project_id, user_id)?;
    NoteDao::delete(conn, note_id)
}

// ============================================================================
// 标签
// ============================================================================

/// 打标签
pub fn add_tag(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
    label: &str,
) -> Result<Vec<Tag>, ProjectError> {
    if label.trim().is_empty() {
        return Err(ProjectError::Validation("标签不能为空".to_string()));
    }
    load_owned_project(conn, project_id, user_id)?;
    TagDao::add(conn, project_id, label.trim())?;
    TagDao::list_by_project(conn, project_id)
}

/// 项目标签列表
pub fn list_tags(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
) -> Result<Vec<Tag>, ProjectError> {
    load_owned_project(conn, project_id, user_id)?;
    TagDao::list_by_project(conn, project_id)
}

/// 移除标签
pub fn remove_tag(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
    label: &str,
) -> Result<(), ProjectError> {
    load_owned_project(conn, project_id, user_id)?;
    TagDao::remove(conn, project_id, label)
}

// ============================================================================
// 测试
// ============================================================================
