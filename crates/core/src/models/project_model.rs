//! 项目数据模型
//!
//! 定义项目及其附属资源的数据结构，包括：
//! - Project（项目）及其状态机
//! - Note（笔记）、Tag（标签）
//! - ToolOutput（独立 AI 文档）
//! - ShareLink（分享链接）
//! - ActivityEntry（活动日志）

use serde::{Deserialize, Serialize};

use super::Owned;

// ============================================================================
// 项目
// ============================================================================

/// 项目状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// 草稿
    Draft,
    /// 进行中
    Active,
    /// 已暂停
    Paused,
    /// 评审中
    Review,
    /// 已完成
    Complete,
    /// 已归档
    Archived,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl ProjectStatus {
    /// 数据库存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Review => "review",
            Self::Complete => "complete",
            Self::Archived => "archived",
        }
    }

    /// 从数据库存储值解析，未知值回退为草稿
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "paused" => Self::Paused,
            "review" => Self::Review,
            "complete" => Self::Complete,
            "archived" => Self::Archived,
            _ => Self::Draft,
        }
    }
}

/// 项目
///
/// 每个项目由唯一的用户独占拥有。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub priority: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Owned for Project {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// 创建项目请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
}

/// 项目更新
///
/// 所有字段可选，未提供的字段保持原值。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<i64>,
}

// ============================================================================
// 笔记与标签
// ============================================================================

/// 项目笔记
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub project_id: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// 项目标签
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub project_id: String,
    pub label: String,
    pub created_at: i64,
}

// ============================================================================
// 独立 AI 文档
// ============================================================================

/// 工具输出
///
/// 独立于步骤流水线的 AI 生成文档（商业计划书、路演摘要等），
/// 按 (project_id, tool_key) 归属。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub id: String,
    pub project_id: String,
    pub tool_key: String,
    pub content: serde_json::Value,
    pub created_at: i64,
    pub updated_at: i64,
}

/// 写入工具输出请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertToolOutputRequest {
    pub tool_key: String,
    pub content: serde_json::Value,
}

// ============================================================================
// 分享链接
// ============================================================================

/// 分享链接
///
/// token 明文只在签发时返回一次，库中仅存 SHA-256 哈希。
#[derive(Debug, Clone)]
pub struct ShareLink {
    pub id: String,
    pub project_id: String,
    pub token_hash: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl ShareLink {
    /// 是否已过期
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

// ============================================================================
// 可选功能：文件夹与提醒
// ============================================================================

/// 项目文件夹（可选功能，需执行可选迁移后才可用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: i64,
}

/// 项目提醒（可选功能，需执行可选迁移后才可用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub project_id: String,
    pub message: String,
    pub remind_at: i64,
    pub created_at: i64,
}

// ============================================================================
// 活动日志
// ============================================================================

/// 活动日志条目
///
/// 尽力而为地记录项目上的变更，写入失败不影响主流程。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub project_id: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub created_at: i64,
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_roundtrip() {
        for status in [
            ProjectStatus::Draft,
            ProjectStatus::Active,
            ProjectStatus::Paused,
            ProjectStatus::Review,
            ProjectStatus::Complete,
            ProjectStatus::Archived,
        ] {
            assert_eq!(ProjectStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn test_project_status_unknown_falls_back_to_draft() {
        assert_eq!(ProjectStatus::parse("nonsense"), ProjectStatus::Draft);
        assert_eq!(ProjectStatus::parse(""), ProjectStatus::Draft);
    }

    #[test]
    fn test_owned_returns_user_id() {
        let project = Project {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            name: "测试项目".to_string(),
            description: None,
            status: ProjectStatus::Draft,
            priority: 0,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(project.owner_id(), "u1");
    }

    #[test]
    fn test_share_link_expiry() {
        let link = ShareLink {
            id: "s1".to_string(),
            project_id: "p1".to_string(),
            token_hash: "h".to_string(),
            created_at: 100,
            expires_at: 200,
        };
        assert!(!link.is_expired(199));
        assert!(link.is_expired(200));
        assert!(link.is_expired(300));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// 任意输入都解析出合法状态，且往返后稳定
        #[test]
        fn prop_status_parse_is_total_and_stable(s in ".*") {
            let status = ProjectStatus::parse(&s);
            prop_assert_eq!(ProjectStatus::parse(status.as_str()), status);
        }
    }
}
