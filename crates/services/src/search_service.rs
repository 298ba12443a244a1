//! 搜索服务
//!
//! 跨项目（名称、描述）与笔记内容的大小写不敏感模糊搜索，
//! 永远限定在调用者自己的数据内。

use rusqlite::Connection;
use serde::Serialize;

use toolthinker_core::database::dao::note_dao::NoteDao;
use toolthinker_core::database::dao::project_dao::ProjectDao;
use toolthinker_core::errors::domain_error::ProjectError;
use toolthinker_core::models::project_model::{Note, Project};

/// 搜索结果
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub projects: Vec<Project>,
    pub notes: Vec<Note>,
}

/// 搜索用户的项目与笔记
pub fn search(conn: &Connection, user_id: &str, query: &str) -> Result<SearchResults, ProjectError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ProjectError::Validation("搜索词不能为空".to_string()));
    }

    let projects = ProjectDao::search(conn, user_id, query)?;
    let notes = NoteDao::search(conn, user_id, query)?;
    Ok(SearchResults {
        query: query.to_string(),
        projects,
        notes,
    })
}
