//! 数据访问层
//!
//! 每个实体一个 DAO，静态方法 + `&Connection`，不持有状态。
//!
//! ## 模块结构
//! - `project_dao`: 项目
//! - `step_dao`: 步骤（含幂等的 get-or-create）
//! - `step_input_dao`: 步骤输入（写入即替换）
//! - `step_output_dao`: 步骤输出（AI 版 + 用户编辑版 + 版本号）
//! - `tool_output_dao`: 独立 AI 文档
//! - `note_dao` / `tag_dao`: 笔记与标签
//! - `activity_dao`: 活动日志（尽力而为）
//! - `share_link_dao`: 分享链接
//! - `user_dao`: 用户与会话
//! - `optional_dao`: 可选功能（folders / reminders）

pub mod activity_dao;
pub mod note_dao;
pub mod optional_dao;
pub mod project_dao;
pub mod share_link_dao;
pub mod step_dao;
pub mod step_input_dao;
pub mod step_output_dao;
pub mod tag_dao;
pub mod tool_output_dao;
pub mod user_dao;
