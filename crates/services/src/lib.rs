//! Tool Thinker 业务服务层
//!
//! 封装核心业务逻辑，介于 HTTP 接口层与数据访问层之间：
//! - `auth_service`: 注册、登录、会话 token 校验
//! - `project_service`: 项目 CRUD、笔记、标签、所有权校验
//! - `step_service`: 工作流步骤的惰性创建、输入写入与完成
//! - `generation_service`: AI 文档生成（含一次 JSON 修复重试）
//! - `consultation_service`: 项目上下文咨询对话
//! - `export_service`: Markdown / HTML / Word 导出
//! - `duplicate_service`: 项目复制
//! - `compare_service`: 多项目对比
//! - `analytics_service`: 项目组合统计
//! - `search_service`: 跨项目与笔记的搜索
//! - `share_service`: 只读分享链接
//! - `llm`: 补全客户端抽象与 OpenAI 兼容实现
//! - `mailer`: 邮件发送抽象（尽力而为）

pub mod analytics_service;
pub mod auth_service;
pub mod compare_service;
pub mod consultation_service;
pub mod duplicate_service;
pub mod export_service;
pub mod generation_service;
pub mod llm;
pub mod mailer;
pub mod project_service;
pub mod search_service;
pub mod share_service;
pub mod step_service;
