//! 步骤输出数据访问层
//!
//! 每个步骤一条输出记录：`ai_output` 为模型生成结果，
//! `user_edited_output` 为用户覆盖版本，`version` 随 AI 重新生成递增。
//! 复制项目时写入的种子记录版本重置为 1。

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::errors::domain_error::StepError;
use crate::models::step_model::StepOutput;

/// 步骤输出 DAO
pub struct StepOutputDao;

impl StepOutputDao {
    /// 写入 AI 输出
    ///
    /// 首次写入 version = 1；已有记录时 version + 1，并清空用户编辑版
    /// （重新生成意味着旧的人工覆盖不再适用）。
    pub fn upsert_ai_output(
        conn: &Connection,
        step_id: &str,
        ai_output: &serde_json::Value,
    ) -> Result<StepOutput, StepError> {
        let now = chrono::Utc::now().timestamp();
        let ai_json = serde_json::to_string(ai_output)?;

        match Self::get_by_step(conn, step_id)? {
            Some(existing) => {
                conn.execute(
                    "UPDATE step_outputs
                     SET ai_output = ?1, user_edited_output = NULL, version = version + 1, updated_at = ?2
                     WHERE step_id = ?3",
                    params![ai_json, now, step_id],
                )?;
                Ok(StepOutput {
                    ai_output: ai_output.clone(),
                    user_edited_output: None,
                    version: existing.version + 1,
                    updated_at: now,
                    ..existing
                })
            }
            None => {
                let id = Uuid::new_v4().to_string();
                conn.execute(
                    "INSERT INTO step_outputs (id, step_id, ai_output, version, created_at, updated_at)
                     VALUES (?1, ?2, ?3, 1, ?4, ?4)",
                    params![id, step_id, ai_json, now],
                )?;
                Ok(StepOutput {
                    id,
                    step_id: step_id.to_string(),
                    ai_output: ai_output.clone(),
                    user_edited_output: None,
                    version: 1,
                    created_at: now,
                    updated_at: now,
                })
            }
        }
    }

    /// 写入用户编辑版（不改 version，不动 AI 版）
    pub fn set_user_edited(
        conn: &Connection,
        step_id: &str,
        edited: &serde_json::Value,
    ) -> Result<StepOutput, StepError> {
        let now = chrono::Utc::now().timestamp();
        let edited_json = serde_json::to_string(edited)?;

        let rows = conn.execute(
            "UPDATE step_outputs SET user_edited_output = ?1, updated_at = ?2 WHERE step_id = ?3",
            params![edited_json, now, step_id],
        )?;
        if rows == 0 {
            return Err(StepError::NotFound(step_id.to_string()));
        }
        Self::get_by_step(conn, step_id)?.ok_or_else(|| StepError::NotFound(step_id.to_string()))
    }

    /// 读取步骤输出
    pub fn get_by_step(conn: &Connection, step_id: &str) -> Result<Option<StepOutput>, StepError> {
        let mut stmt = conn.prepare(
            "SELECT id, step_id, ai_output, user_edited_output, version, created_at, updated_at
             FROM step_outputs WHERE step_id = ?",
        )?;
        let mut rows = stmt.query([step_id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::map_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// 复制项目时写入种子输出：携带原 AI 版与用户编辑版，版本重置为 1
    pub fn insert_seed(
        conn: &Connection,
        step_id: &str,
        ai_output: &serde_json::Value,
        user_edited_output: Option<&serde_json::Value>,
    ) -> Result<StepOutput, StepError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        let ai_json = serde_json::to_string(ai_output)?;
        let edited_json = user_edited_output.map(serde_json::to_string).transpose()?;

        conn.execute(
            "INSERT INTO step_outputs (id, step_id, ai_output, user_edited_output, version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
            params![id, step_id, ai_json, edited_json, now],
        )?;
        Ok(StepOutput {
            id,
            step_id: step_id.to_string(),
            ai_output: ai_output.clone(),
            user_edited_output: user_edited_output.cloned(),
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// 映射数据库行到 StepOutput 结构体
    fn map_row(row: &rusqlite::Row) -> Result<StepOutput, rusqlite::Error> {
        let ai_json: String = row.get(2)?;
        let edited_json: Option<String> = row.get(3)?;
        let parse = |s: &str| {
            serde_json::from_str(s).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        };
        Ok(StepOutput {
            id: row.get(0)?,
            step_id: row.get(1)?,
            ai_output: parse(&ai_json)?,
            user_edited_output: edited_json.as_deref().map(parse).transpose()?,
            version: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

// ============================================================================
// 测试
// ============================================================================
