//! API 统一错误模型
//!
//! 为 HTTP 层提供稳定的错误语义，便于客户端统一处理。

use serde::{Deserialize, Serialize};

/// API 错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    /// 请求参数缺失或无效
    ValidationError,
    /// 缺少或无效的 bearer token
    Unauthorized,
    /// 资源存在但不属于调用者
    Forbidden,
    /// 资源不存在
    NotFound,
    /// 模型输出经一次修复后仍不可解析
    GenerationFailed,
    /// 可选功能的存储尚未开通
    UpstreamUnavailable,
    /// 服务内部错误
    InternalError,
}

impl ApiErrorCode {
    /// 对应的 HTTP 状态码
    pub fn status_code(self) -> u16 {
        match self {
            Self::ValidationError => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::GenerationFailed => 500,
            Self::InternalError => 500,
            Self::UpstreamUnavailable => 503,
        }
    }

    /// 默认错误文案
    pub fn default_message(self) -> &'static str {
        match self {
            Self::ValidationError => "请求参数无效",
            Self::Unauthorized => "未认证或 token 无效",
            Self::Forbidden => "无权访问该资源",
            Self::NotFound => "资源不存在",
            Self::GenerationFailed => "AI 生成失败，请稍后重试",
            Self::UpstreamUnavailable => "功能尚未开通，请先执行对应迁移",
            Self::InternalError => "服务内部错误",
        }
    }

    /// 是否可重试
    pub fn retryable(self) -> bool {
        matches!(
            self,
            Self::GenerationFailed | Self::UpstreamUnavailable | Self::InternalError
        )
    }
}

/// API 错误详情
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    /// 创建错误详情；消息为空时使用错误码的默认文案
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let final_message = if message.trim().is_empty() {
            code.default_message().to_string()
        } else {
            message
        };

        Self {
            code,
            message: final_message,
            retryable: code.retryable(),
        }
    }
}

/// API 错误响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// 创建响应
    pub fn new(error: ApiError) -> Self {
        Self { error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_match_taxonomy() {
        assert_eq!(ApiErrorCode::ValidationError.status_code(), 400);
        assert_eq!(ApiErrorCode::Unauthorized.status_code(), 401);
        assert_eq!(ApiErrorCode::Forbidden.status_code(), 403);
        assert_eq!(ApiErrorCode::NotFound.status_code(), 404);
        assert_eq!(ApiErrorCode::GenerationFailed.status_code(), 500);
        assert_eq!(ApiErrorCode::UpstreamUnavailable.status_code(), 503);
    }

    #[test]
    fn test_empty_message_uses_default() {
        let err = ApiError::new(ApiErrorCode::Unauthorized, "");
        assert_eq!(err.message, "未认证或 token 无效");

        let err = ApiError::new(ApiErrorCode::NotFound, "项目不存在: p-1");
        assert_eq!(err.message, "项目不存在: p-1");
    }

    #[test]
    fn test_retryable_codes() {
        assert!(ApiErrorCode::GenerationFailed.retryable());
        assert!(ApiErrorCode::UpstreamUnavailable.retryable());
        assert!(!ApiErrorCode::Forbidden.retryable());
        assert!(!ApiErrorCode::ValidationError.retryable());
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ApiErrorCode::GenerationFailed).unwrap();
        assert_eq!(json, "\"GENERATION_FAILED\"");
    }
}
