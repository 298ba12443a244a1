//! 项目数据访问层
//!
//! 提供项目（Project）的 CRUD 操作。所有权校验在服务层完成，
//! DAO 只负责按 ID / 用户筛选。

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::errors::domain_error::ProjectError;
use crate::models::project_model::{CreateProjectRequest, Project, ProjectStatus, ProjectUpdate};

// ============================================================================
// 数据访问对象
// ============================================================================

/// 项目 DAO
pub struct ProjectDao;

impl ProjectDao {
    /// 创建新项目
    pub fn create(
        conn: &Connection,
        user_id: &str,
        req: &CreateProjectRequest,
    ) -> Result<Project, ProjectError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        let priority = req.priority.unwrap_or(0);

        conn.execute(
            "INSERT INTO projects (id, user_id, name, description, status, priority, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                user_id,
                req.name,
                req.description,
                ProjectStatus::Draft.as_str(),
                priority,
                now,
                now,
            ],
        )?;

        Ok(Project {
            id,
            user_id: user_id.to_string(),
            name: req.name.clone(),
            description: req.description.clone(),
            status: ProjectStatus::Draft,
            priority,
            created_at: now,
            updated_at: now,
        })
    }

    /// 按 ID 获取项目
    pub fn get(conn: &Connection, id: &str) -> Result<Option<Project>, ProjectError> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, description, status, priority, created_at, updated_at
             FROM projects WHERE id = ?",
        )?;
        let mut rows = stmt.query([id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::map_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// 获取用户的项目列表，按更新时间倒序
    pub fn list_by_user(conn: &Connection, user_id: &str) -> Result<Vec<Project>, ProjectError> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, description, status, priority, created_at, updated_at
             FROM projects WHERE user_id = ? ORDER BY updated_at DESC",
        )?;
        let projects: Vec<Project> = stmt
            .query_map([user_id], |row| Self::map_row(row))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(projects)
    }

    /// 更新项目，未提供的字段保持原值
    pub fn update(
        conn: &Connection,
        id: &str,
        update: &ProjectUpdate,
    ) -> Result<Project, ProjectError> {
        let existing = Self::get(conn, id)?.ok_or_else(|| ProjectError::NotFound(id.to_string()))?;
        let now = chrono::Utc::now().timestamp();

        let name = update.name.as_ref().unwrap_or(&existing.name);
        let description = update.description.clone().or(existing.description);
        let status = update.status.unwrap_or(existing.status);
        let priority = update.priority.unwrap_or(existing.priority);

        conn.execute(
            "UPDATE projects SET name = ?1, description = ?2, status = ?3, priority = ?4, updated_at = ?5
             WHERE id = ?6",
            params![name, description, status.as_str(), priority, now, id],
        )?;

        Self::get(conn, id)?.ok_or_else(|| ProjectError::NotFound(id.to_string()))
    }

    /// 删除项目（级联删除步骤与附属记录）
    pub fn delete(conn: &Connection, id: &str) -> Result<(), ProjectError> {
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(ProjectError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// 模糊搜索用户的项目（名称或描述）
    pub fn search(
        conn: &Connection,
        user_id: &str,
        query: &str,
    ) -> Result<Vec<Project>, ProjectError> {
        let pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, description, status, priority, created_at, updated_at
             FROM projects
             WHERE user_id = ?1 AND (name LIKE ?2 COLLATE NOCASE OR description LIKE ?2 COLLATE NOCASE)
             ORDER BY updated_at DESC",
        )?;
        let projects: Vec<Project> = stmt
            .query_map(params![user_id, pattern], |row| Self::map_row(row))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(projects)
    }

    /// 映射数据库行到 Project 结构体
    fn map_row(row: &rusqlite::Row) -> Result<Project, rusqlite::Error> {
        let status: String = row.get(4)?;
        Ok(Project {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            status: ProjectStatus::parse(&status),
            priority: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::create_tables;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (id, email, password_hash, salt, created_at)
             VALUES ('u1', 'founder@example.com', 'h', 's', 0)",
            [],
        )
        .unwrap();
        conn
    }

    fn create_req(name: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            name: name.to_string(),
            description: None,
            priority: None,
        }
    }

    #[test]
    fn test_create_project_defaults() {
        let conn = setup_test_db();
        let project = ProjectDao::create(&conn, "u1", &create_req("My Startup")).unwrap();

        assert!(!project.id.is_empty());
        assert_eq!(project.user_id, "u1");
        assert_eq!(project.status, ProjectStatus::Draft);
        assert_eq!(project.priority, 0);
    }

    #[test]
    fn test_get_nonexistent_project() {
        let conn = setup_test_db();
        assert!(ProjectDao::get(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn test_list_by_user_scoped() {
        let conn = setup_test_db();
        conn.execute(
            "INSERT INTO users (id, email, password_hash, salt, created_at)
             VALUES ('u2', 'other@example.com', 'h', 's', 0)",
            [],
        )
        .unwrap();

        ProjectDao::create(&conn, "u1", &create_req("A")).unwrap();
        ProjectDao::create(&conn, "u1", &create_req("B")).unwrap();
        ProjectDao::create(&conn, "u2", &create_req("C")).unwrap();

        let list = ProjectDao::list_by_user(&conn, "u1").unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|p| p.user_id == "u1"));
    }

    #[test]
    fn test_update_partial() {
        let conn = setup_test_db();
        let project = ProjectDao::create(&conn, "u1", &create_req("Original")).unwrap();

        let update = ProjectUpdate {
            name: Some("Renamed".to_string()),
            status: Some(ProjectStatus::Active),
            ..Default::default()
        };
        let updated = ProjectDao::update(&conn, &project.id, &update).unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.status, ProjectStatus::Active);
        // 未提供的字段保持原值
        assert_eq!(updated.priority, 0);
    }

    #[test]
    fn test_update_nonexistent() {
        let conn = setup_test_db();
        let result = ProjectDao::update(&conn, "nope", &ProjectUpdate::default());
        assert!(matches!(result, Err(ProjectError::NotFound(_))));
    }

    #[test]
    fn test_delete_project() {
        let conn = setup_test_db();
        let project = ProjectDao::create(&conn, "u1", &create_req("Doomed")).unwrap();
        ProjectDao::delete(&conn, &project.id).unwrap();
        assert!(ProjectDao::get(&conn, &project.id).unwrap().is_none());

        let result = ProjectDao::delete(&conn, &project.id);
        assert!(matches!(result, Err(ProjectError::NotFound(_))));
    }

    #[test]
    fn test_search_case_insensitive() {
        let conn = setup_test_db();
        ProjectDao::create(
            &conn,
            "u1",
            &CreateProjectRequest {
                name: "Lab Marketplace".to_string(),
                description: Some("used equipment".to_string()),
                priority: None,
            },
        )
        .unwrap();
        ProjectDao::create(&conn, "u1", &create_req("Other")).unwrap();

        assert_eq!(ProjectDao::search(&conn, "u1", "MARKET").unwrap().len(), 1);
        assert_eq!(ProjectDao::search(&conn, "u1", "equip").unwrap().len(), 1);
        assert_eq!(ProjectDao::search(&conn, "u1", "zzz").unwrap().len(), 0);
    }
}
