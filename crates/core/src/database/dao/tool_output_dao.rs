//! 工具输出数据访问层
//!
//! 独立 AI 文档按 (project_id, tool_key) 归属，写入即覆盖。

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::errors::domain_error::ToolOutputError;
use crate::models::project_model::ToolOutput;

/// 工具输出 DAO
pub struct ToolOutputDao;

impl ToolOutputDao {
    /// 写入或覆盖工具输出
    pub fn upsert(
        conn: &Connection,
        project_id: &str,
        tool_key: &str,
        content: &serde_json::Value,
    ) -> Result<ToolOutput, ToolOutputError> {
        let now = chrono::Utc::now().timestamp();
        let content_json = serde_json::to_string(content)?;

        match Self::get_by_key(conn, project_id, tool_key)? {
            Some(existing) => {
                conn.execute(
                    "UPDATE tool_outputs SET content = ?1, updated_at = ?2
                     WHERE project_id = ?3 AND tool_key = ?4",
                    params![content_json, now, project_id, tool_key],
                )?;
                Ok(ToolOutput {
                    content: content.clone(),
                    updated_at: now,
                    ..existing
                })
            }
            None => {
                let id = Uuid::new_v4().to_string();
                conn.execute(
                    "INSERT INTO tool_outputs (id, project_id, tool_key, content, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    params![id, project_id, tool_key, content_json, now],
                )?;
                Ok(ToolOutput {
                    id,
                    project_id: project_id.to_string(),
                    tool_key: tool_key.to_string(),
                    content: content.clone(),
                    created_at: now,
                    updated_at: now,
                })
            }
        }
    }

    /// 按 (project_id, tool_key) 读取
    pub fn get_by_key(
        conn: &Connection,
        project_id: &str,
        tool_key: &str,
    ) -> Result<Option<ToolOutput>, ToolOutputError> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, tool_key, content, created_at, updated_at
             FROM tool_outputs WHERE project_id = ?1 AND tool_key = ?2",
        )?;
        let mut rows = stmt.query(params![project_id, tool_key])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::map_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// 项目下的全部工具输出
    pub fn list_by_project(
        conn: &Connection,
        project_id: &str,
    ) -> Result<Vec<ToolOutput>, ToolOutputError> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, tool_key, content, created_at, updated_at
             FROM tool_outputs WHERE project_id = ? ORDER BY updated_at DESC",
        )?;
        let outputs: Vec<ToolOutput> = stmt
            .query_map([project_id], |row| Self::map_row(row))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(outputs)
    }

    /// 删除工具输出
    pub fn delete(
        conn: &Connection,
        project_id: &str,
        tool_key: &str,
    ) -> Result<(), ToolOutputError> {
        let rows = conn.execute(
            "DELETE FROM tool_outputs WHERE project_id = ?1 AND tool_key = ?2",
            params![project_id, tool_key],
        )?;
        if rows == 0 {
            return Err(ToolOutputError::NotFound(tool_key.to_string()));
        }
        Ok(())
    }

    fn map_row(row: &rusqlite::Row) -> Result<ToolOutput, rusqlite::Error> {
        let content_json: String = row.get(3)?;
        let content = serde_json::from_str(&content_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(ToolOutput {
            id: row.get(0)?,
            project_id: row.get(1)?,
            tool_key: row.get(2)?,
            content,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}
