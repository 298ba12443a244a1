//! 标签数据访问层

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::errors::domain_error::ProjectError;
use crate::models::project_model::Tag;

/// 标签 DAO
pub struct TagDao;

impl TagDao {
    /// 给项目打标签；重复标签静默忽略
    pub fn add(conn: &Connection, project_id: &str, label: &str) -> Result<(), ProjectError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT OR IGNORE INTO tags (id, project_id, label, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, project_id, label, now],
        )?;
        Ok(())
    }

    /// 项目的全部标签
    pub fn list_by_project(conn: &Connection, project_id: &str) -> Result<Vec<Tag>, ProjectError> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, label, created_at
             FROM tags WHERE project_id = ? ORDER BY created_at",
        )?;
        let tags: Vec<Tag> = stmt
            .query_map([project_id], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    label: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(tags)
    }

    /// 移除标签
    pub fn remove(conn: &Connection, project_id: &str, label: &str) -> Result<(), ProjectError> {
        conn.execute(
            "DELETE FROM tags WHERE project_id = ?1 AND label = ?2",
            params![project_id, label],
        )?;
        Ok(())
    }
}
