//! 数据模型模块
//!
//! 定义 Tool Thinker 的核心数据结构。
//!
//! ## 模块结构
//! - `project_model`: 项目及附属资源（笔记、标签、工具输出、分享链接）
//! - `step_model`: 工作流步骤、步骤输入/输出
//! - `user_model`: 用户与会话

pub mod project_model;
pub mod step_model;
pub mod user_model;

/// 拥有者能力
///
/// 所有带 owner 字段的资源实现本 trait，配合统一的
/// load-and-authorize 辅助函数做所有权校验，避免在每个
/// 接口里重复 `if resource.user_id != caller` 的判断。
pub trait Owned {
    /// 资源拥有者的用户 ID
    fn owner_id(&self) -> &str;
}
