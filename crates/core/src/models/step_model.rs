//! 工作流步骤数据模型
//!
//! 定义步骤、步骤输入、步骤输出的数据结构。
//!
//! ## 不变量
//! - 同一项目内 step_key 唯一，相对顺序由框架注册表的固定顺序决定
//! - 有效输出 = 用户编辑版（若存在）否则 AI 版，二者从不合并
//! - 步骤存在不代表已有输出

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// 步骤
// ============================================================================

/// 步骤状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// 未开始
    NotStarted,
    /// 进行中
    InProgress,
    /// 已完成
    Completed,
}

impl Default for StepStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl StepStatus {
    /// 数据库存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// 从数据库存储值解析，未知值回退为未开始
    pub fn parse(s: &str) -> Self {
        match s {
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::NotStarted,
        }
    }
}

/// 工作流步骤
///
/// 按 (project_id, step_key) 惰性创建，首次创建时状态为未开始、
/// 起止时间均为空。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub project_id: String,
    pub step_key: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

// ============================================================================
// 步骤输入
// ============================================================================

/// 步骤输入
///
/// 每个步骤只保留一条"当前"输入记录，写入即替换。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepInput {
    pub id: String,
    pub step_id: String,
    /// 自由键值对（问题 ID -> 用户回答）
    pub data: HashMap<String, serde_json::Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

// ============================================================================
// 步骤输出
// ============================================================================

/// 步骤输出
///
/// `ai_output` 为模型生成的键值对；`user_edited_output` 为同形状的
/// 用户覆盖版本。读取时用户版优先。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutput {
    pub id: String,
    pub step_id: String,
    pub ai_output: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_edited_output: Option<serde_json::Value>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl StepOutput {
    /// 有效输出：用户编辑版优先，否则 AI 版
    ///
    /// 二者从不合并。
    pub fn effective(&self) -> &serde_json::Value {
        self.user_edited_output.as_ref().unwrap_or(&self.ai_output)
    }
}

// ============================================================================
// 步骤快照（对比用）
// ============================================================================

/// 单个步骤的快照
#[derive(Debug, Clone, Serialize)]
pub struct StepSnapshot {
    pub step_key: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<HashMap<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_output(user_edited: Option<serde_json::Value>) -> StepOutput {
        StepOutput {
            id: "o1".to_string(),
            step_id: "s1".to_string(),
            ai_output: json!({"x": "1"}),
            user_edited_output: user_edited,
            version: 1,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_step_status_roundtrip() {
        for status in [
            StepStatus::NotStarted,
            StepStatus::InProgress,
            StepStatus::Completed,
        ] {
            assert_eq!(StepStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn test_step_status_unknown_falls_back() {
        assert_eq!(StepStatus::parse("???"), StepStatus::NotStarted);
    }

    #[test]
    fn test_effective_output_prefers_user_edit() {
        let output = sample_output(Some(json!({"x": "edited"})));
        assert_eq!(output.effective(), &json!({"x": "edited"}));
    }

    #[test]
    fn test_effective_output_falls_back_to_ai() {
        let output = sample_output(None);
        assert_eq!(output.effective(), &json!({"x": "1"}));
    }

    #[test]
    fn test_effective_output_never_merges() {
        // 用户版缺少 AI 版中的字段时，不得从 AI 版补齐
        let output = sample_output(Some(json!({"y": "2"})));
        assert_eq!(output.effective(), &json!({"y": "2"}));
        assert!(output.effective().get("x").is_none());
    }
}
