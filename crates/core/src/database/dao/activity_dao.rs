//! 活动日志数据访问层
//!
//! 活动日志是尽力而为的附属记录：服务层写入失败只打日志，
//! 从不作为用户可见错误向上传播。

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::errors::domain_error::ProjectError;
use crate::models::project_model::ActivityEntry;

/// 活动日志 DAO
pub struct ActivityDao;

impl ActivityDao {
    /// 追加一条活动记录
    pub fn append(
        conn: &Connection,
        project_id: &str,
        action: &str,
        detail: Option<&str>,
    ) -> Result<(), ProjectError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO activity_log (id, project_id, action, detail, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, project_id, action, detail, now],
        )?;
        Ok(())
    }

    /// 项目最近的活动记录
    pub fn list_recent(
        conn: &Connection,
        project_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, ProjectError> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, action, detail, created_at
             FROM activity_log WHERE project_id = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;
        let entries: Vec<ActivityEntry> = stmt
            .query_map(params![project_id, limit as i64], |row| {
                Ok(ActivityEntry {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    action: row.get(2)?,
                    detail: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::create_tables;

    #[test]
    fn test_append_and_list() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        ActivityDao::append(&conn, "p1", "project.created", None).unwrap();
        ActivityDao::append(&conn, "p1", "step.generated", Some("lean_canvas")).unwrap();

        let entries = ActivityDao::list_recent(&conn, "p1", 10).unwrap();
        assert_eq!(entries.len(), 2);

        let limited = ActivityDao::list_recent(&conn, "p1", 1).unwrap();
        assert_eq!(limited.len(), 1);
    }
}
