//! 步骤输入数据访问层
//!
//! 每个步骤只保留一条"当前"输入记录：写入即整条替换，
//! 由 step_id 上的 UNIQUE 约束配合 INSERT OR REPLACE 实现。

use rusqlite::{params, Connection};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::domain_error::StepError;
use crate::models::step_model::StepInput;

/// 步骤输入 DAO
pub struct StepInputDao;

impl StepInputDao {
    /// 替换步骤的当前输入
    ///
    /// 已有记录时保留 created_at，只更新 data 与 updated_at。
    pub fn replace(
        conn: &Connection,
        step_id: &str,
        data: &HashMap<String, serde_json::Value>,
    ) -> Result<StepInput, StepError> {
        let now = chrono::Utc::now().timestamp();
        let data_json = serde_json::to_string(data)?;

        let existing = Self::get_by_step(conn, step_id)?;
        match existing {
            Some(input) => {
                conn.execute(
                    "UPDATE step_inputs SET data = ?1, updated_at = ?2 WHERE step_id = ?3",
                    params![data_json, now, step_id],
                )?;
                Ok(StepInput {
                    data: data.clone(),
                    updated_at: now,
                    ..input
                })
            }
            None => {
                let id = Uuid::new_v4().to_string();
                conn.execute(
                    "INSERT INTO step_inputs (id, step_id, data, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![id, step_id, data_json, now],
                )?;
                Ok(StepInput {
                    id,
                    step_id: step_id.to_string(),
                    data: data.clone(),
                    created_at: now,
                    updated_at: now,
                })
            }
        }
    }

    /// 读取步骤的当前输入
    pub fn get_by_step(conn: &Connection, step_id: &str) -> Result<Option<StepInput>, StepError> {
        let mut stmt = conn.prepare(
            "SELECT id, step_id, data, created_at, updated_at FROM step_inputs WHERE step_id = ?",
        )?;
        let mut rows = stmt.query([step_id])?;

        if let Some(row) = rows.next()? {
            let data_json: String = row.get(2)?;
            let data: HashMap<String, serde_json::Value> = serde_json::from_str(&data_json)?;
            Ok(Some(StepInput {
                id: row.get(0)?,
                step_id: row.get(1)?,
                data,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            }))
        } else {
            Ok(None)
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
