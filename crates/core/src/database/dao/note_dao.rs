//! 笔记数据访问层

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::errors::domain_error::ProjectError;
use crate::models::project_model::Note;

/// 笔记 DAO
pub struct NoteDao;

impl NoteDao {
    /// 创建笔记
    pub fn create(
        conn: &Connection,
        project_id: &str,
        content: &str,
    ) -> Result<Note, ProjectError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO notes (id, project_id, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![id, project_id, content, now],
        )?;
        Ok(Note {
            id,
            project_id: project_id.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// 项目下的全部笔记，按创建时间倒序
    pub fn list_by_project(conn: &Connection, project_id: &str) -> Result<Vec<Note>, ProjectError> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, content, created_at, updated_at
             FROM notes WHERE project_id = ? ORDER BY created_at DESC",
        )?;
        let notes: Vec<Note> = stmt
            .query_map([project_id], |row| {
                Ok(Note {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    content: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(notes)
    }

    /// 删除笔记
    pub fn delete(conn: &Connection, id: &str) -> Result<(), ProjectError> {
        let rows = conn.execute("DELETE FROM notes WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(ProjectError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// 模糊搜索用户的笔记内容
    pub fn search(conn: &Connection, user_id: &str, query: &str) -> Result<Vec<Note>, ProjectError> {
        let pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            "SELECT n.id, n.project_id, n.content, n.created_at, n.updated_at
             FROM notes n JOIN projects p ON p.id = n.project_id
             WHERE p.user_id = ?1 AND n.content LIKE ?2 COLLATE NOCASE
             ORDER BY n.created_at DESC",
        )?;
        let notes: Vec<Note> = stmt
            .query_map(params![user_id, pattern], |row| {
                Ok(Note {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    content: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(notes)
    }
}
