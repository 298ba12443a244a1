//! 创业规划框架注册表
//!
//! 定义固定有序的创业规划工作流：每个框架对应一个步骤 key，
//! 携带问题清单、输出字段（schema）、提示词构建逻辑和完整性检查。
//!
//! ## 设计原则
//! - 注册表在进程启动时构建一次，之后只读（无生命周期、无须清理）
//! - 步骤顺序以 `FRAMEWORKS` 数组的声明顺序为准，所有遍历都走这个顺序
//! - 框架定义不落库，数据库里只存步骤实例和输入/输出

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::collections::HashMap;

mod defs;

pub use defs::FRAMEWORKS;

// ============================================================================
// 框架定义
// ============================================================================

/// 框架问题
#[derive(Debug, Clone, Copy)]
pub struct Question {
    /// 问题 ID，同时是步骤输入 data 里的键
    pub id: &'static str,
    /// 展示给用户的问题文案
    pub label: &'static str,
    /// 是否必答；完整性检查只看必答题
    pub required: bool,
}

/// 框架定义（静态）
///
/// key、标题、问题清单、输出字段和提示词构建逻辑。
#[derive(Debug, Clone, Copy)]
pub struct FrameworkDef {
    /// 步骤 key，全局唯一
    pub key: &'static str,
    /// 框架标题，用于导出标题和界面展示
    pub title: &'static str,
    /// 一句话描述
    pub description: &'static str,
    /// 有序问题清单
    pub questions: &'static [Question],
    /// 模型输出必须包含的字段（输出 schema）
    pub output_fields: &'static [&'static str],
}

impl FrameworkDef {
    /// 从用户回答构建单条提示词
    ///
    /// 回答按问题声明顺序拼接；未回答的问题跳过。
    /// schema 约束（"只返回 JSON"）由调用方作为 system 指令下发。
    pub fn build_prompt(&self, inputs: &HashMap<String, serde_json::Value>) -> String {
        let mut prompt = String::new();
        prompt.push_str(&format!(
            "You are a startup advisor. Apply the \"{}\" framework: {}\n\n",
            self.title, self.description
        ));
        prompt.push_str("Founder's answers:\n");
        for question in self.questions {
            if let Some(value) = inputs.get(question.id) {
                let answer = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                if !answer.trim().is_empty() {
                    prompt.push_str(&format!("- {}: {}\n", question.label, answer));
                }
            }
        }
        prompt.push_str(&format!(
            "\nReturn a JSON object with exactly these keys: {}.\n\
             Each value must be either a string or an array of strings.",
            self.output_fields.join(", ")
        ));
        prompt
    }

    /// 完整性检查：所有必答题都有非空回答
    pub fn is_complete(&self, inputs: &HashMap<String, serde_json::Value>) -> bool {
        self.questions
            .iter()
            .filter(|q| q.required)
            .all(|q| match inputs.get(q.id) {
                Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
                Some(serde_json::Value::Null) | None => false,
                Some(_) => true,
            })
    }
}

// ============================================================================
// 注册表
// ============================================================================

/// key -> 框架定义 的只读映射，保持声明顺序
static REGISTRY: Lazy<IndexMap<&'static str, &'static FrameworkDef>> =
    Lazy::new(|| FRAMEWORKS.iter().map(|f| (f.key, f)).collect());

/// 按 key 查找框架定义
pub fn get(key: &str) -> Option<&'static FrameworkDef> {
    REGISTRY.get(key).copied()
}

/// 固定顺序的全部框架定义
pub fn all() -> impl Iterator<Item = &'static FrameworkDef> {
    REGISTRY.values().copied()
}

/// 固定顺序的全部步骤 key
pub fn step_keys() -> impl Iterator<Item = &'static str> {
    REGISTRY.keys().copied()
}

/// 步骤总数
pub fn step_count() -> usize {
    REGISTRY.len()
}

/// key 是否属于固定工作流
pub fn is_valid_key(key: &str) -> bool {
    REGISTRY.contains_key(key)
}

// ============================================================================
// 测试
// ============================================================================
