//! 步骤数据访问层
//!
//! 核心是幂等的 get-or-create：给定 (project_id, step_key)，
//! 存在则返回，不存在则以"未开始"创建。并发下的唯一性由
//! UNIQUE(project_id, step_key) 约束保障，插入冲突时重新读取。

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::errors::domain_error::StepError;
use crate::models::step_model::{Step, StepStatus};

// ============================================================================
// 数据访问对象
// ============================================================================

/// 步骤 DAO
pub struct StepDao;

impl StepDao {
    /// 获取或创建步骤（幂等）
    ///
    /// 首次创建时状态为未开始，起止时间为空。并发插入撞上
    /// 唯一约束时回退为重新读取，两个调用方拿到同一条记录。
    pub fn get_or_create(
        conn: &Connection,
        project_id: &str,
        step_key: &str,
    ) -> Result<Step, StepError> {
        if let Some(step) = Self::get_by_key(conn, project_id, step_key)? {
            return Ok(step);
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO steps (id, project_id, step_key, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                project_id,
                step_key,
                StepStatus::NotStarted.as_str(),
                now,
                now
            ],
        )?;

        if inserted == 0 {
            tracing::debug!("步骤创建撞上唯一约束，重新读取: {} / {}", project_id, step_key);
        }

        // 无论是否本次插入成功，都以库里这条为准
        Self::get_by_key(conn, project_id, step_key)?
            .ok_or_else(|| StepError::NotFound(format!("{project_id}/{step_key}")))
    }

    /// 按 (project_id, step_key) 读取
    pub fn get_by_key(
        conn: &Connection,
        project_id: &str,
        step_key: &str,
    ) -> Result<Option<Step>, StepError> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, step_key, status, started_at, completed_at, created_at, updated_at
             FROM steps WHERE project_id = ?1 AND step_key = ?2",
        )?;
        let mut rows = stmt.query(params![project_id, step_key])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::map_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// 按 ID 读取
    pub fn get(conn: &Connection, id: &str) -> Result<Option<Step>, StepError> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, step_key, status, started_at, completed_at, created_at, updated_at
             FROM steps WHERE id = ?",
        )?;
        let mut rows = stmt.query([id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::map_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// 项目下的全部步骤（无固定顺序，调用方按框架顺序重排）
    pub fn list_by_project(conn: &Connection, project_id: &str) -> Result<Vec<Step>, StepError> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, step_key, status, started_at, completed_at, created_at, updated_at
             FROM steps WHERE project_id = ?",
        )?;
        let steps: Vec<Step> = stmt
            .query_map([project_id], |row| Self::map_row(row))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(steps)
    }

    /// 标记进行中；首次进入时写 started_at
    pub fn mark_in_progress(conn: &Connection, id: &str) -> Result<Step, StepError> {
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "UPDATE steps SET status = ?1,
                    started_at = COALESCE(started_at, ?2),
                    updated_at = ?2
             WHERE id = ?3",
            params![StepStatus::InProgress.as_str(), now, id],
        )?;
        Self::get(conn, id)?.ok_or_else(|| StepError::NotFound(id.to_string()))
    }

    /// 标记已完成并写 completed_at
    pub fn mark_completed(conn: &Connection, id: &str) -> Result<Step, StepError> {
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "UPDATE steps SET status = ?1,
                    started_at = COALESCE(started_at, ?2),
                    completed_at = ?2,
                    updated_at = ?2
             WHERE id = ?3",
            params![StepStatus::Completed.as_str(), now, id],
        )?;
        Self::get(conn, id)?.ok_or_else(|| StepError::NotFound(id.to_string()))
    }

    /// 复制步骤到另一项目时使用：带状态与时间戳的原样写入
    pub fn insert_copy(
        conn: &Connection,
        project_id: &str,
        source: &Step,
    ) -> Result<Step, StepError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO steps (id, project_id, step_key, status, started_at, completed_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                id,
                project_id,
                source.step_key,
                source.status.as_str(),
                source.started_at,
                source.completed_at,
                now,
            ],
        )?;
        Self::get(conn, &id)?.ok_or_else(|| StepError::NotFound(id))
    }

    /// 映射数据库行到 Step 结构体
    fn map_row(row: &rusqlite::Row) -> Result<Step, rusqlite::Error> {
        let status: String = row.get(3)?;
        Ok(Step {
            id: row.get(0)?,
            project_id: row.get(1)?,
            step_key: row.get(2)?,
            status: StepStatus::parse(&status),
            started_at: row.get(4)?,
            completed_at: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

// ============================================================================
// 测试
// ============================================================================
