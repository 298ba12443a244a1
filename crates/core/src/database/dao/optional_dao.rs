//! 可选功能数据访问层（文件夹 / 提醒）
//!
//! 对应表只由可选迁移创建。每个操作入口先检查表是否存在，
//! 不存在时返回 FeatureUnavailable，由接口层映射为 503。

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::database::schema::table_exists;
use crate::errors::domain_error::ProjectError;
use crate::models::project_model::{Folder, Reminder};

fn require_table(conn: &Connection, table: &str) -> Result<(), ProjectError> {
    if !table_exists(conn, table)? {
        return Err(ProjectError::FeatureUnavailable(table.to_string()));
    }
    Ok(())
}

/// 文件夹 DAO
pub struct FolderDao;

impl FolderDao {
    /// 创建文件夹
    pub fn create(conn: &Connection, user_id: &str, name: &str) -> Result<Folder, ProjectError> {
        require_table(conn, "folders")?;

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO folders (id, user_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, user_id, name, now],
        )?;
        Ok(Folder {
            id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            created_at: now,
        })
    }

    /// 用户的全部文件夹
    pub fn list_by_user(conn: &Connection, user_id: &str) -> Result<Vec<Folder>, ProjectError> {
        require_table(conn, "folders")?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, created_at
             FROM folders WHERE user_id = ? ORDER BY created_at",
        )?;
        let folders: Vec<Folder> = stmt
            .query_map([user_id], |row| {
                Ok(Folder {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(folders)
    }

    /// 删除文件夹
    pub fn delete(conn: &Connection, id: &str) -> Result<(), ProjectError> {
        require_table(conn, "folders")?;

        let rows = conn.execute("DELETE FROM folders WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(ProjectError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// 提醒
// ============================================================================

/// 提醒 DAO
pub struct ReminderDao;

impl ReminderDao {
    /// 创建提醒
    pub fn create(
        conn: &Connection,
        project_id: &str,
        message: &str,
        remind_at: i64,
    ) -> Result<Reminder, ProjectError> {
        require_table(conn, "reminders")?;

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO reminders (id, project_id, message, remind_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, project_id, message, remind_at, now],
        )?;
        Ok(Reminder {
            id,
            project_id: project_id.to_string(),
            message: message.to_string(),
            remind_at,
            created_at: now,
        })
    }

    /// 项目的全部提醒，按提醒时间排序
    pub fn list_by_project(
        conn: &Connection,
        project_id: &str,
    ) -> Result<Vec<Reminder>, ProjectError> {
        require_table(conn, "reminders")?;

        let mut stmt = conn.prepare(
            "SELECT id, project_id, message, remind_at, created_at
             FROM reminders WHERE project_id = ? ORDER BY remind_at",
        )?;
        let reminders: Vec<Reminder> = stmt
            .query_map([project_id], |row| {
                Ok(Reminder {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    message: row.get(2)?,
                    remind_at: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(reminders)
    }

    /// 删除提醒
    pub fn delete(conn: &Connection, id: &str) -> Result<(), ProjectError> {
        require_table(conn, "reminders")?;

        let rows = conn.execute("DELETE FROM reminders WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(ProjectError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
