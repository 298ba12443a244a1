//! 错误类型模块
//!
//! 定义 Tool Thinker 应用中的各种错误类型。
//!
//! ## 模块结构
//! - `domain_error`: 领域错误（ProjectError, StepError, AuthError, GenerationError 等）
//! - `api_error`: 统一 API 错误封装（错误码、消息、HTTP 状态）

pub mod api_error;
pub mod domain_error;

// 重新导出常用错误类型
#[allow(unused_imports)]
pub use api_error::{ApiError, ApiErrorCode, ApiErrorResponse};
#[allow(unused_imports)]
pub use domain_error::{
    AuthError, CompareError, GenerationError, ProjectError, StepError, ToolOutputError,
};
