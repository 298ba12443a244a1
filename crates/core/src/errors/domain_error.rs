//! 领域错误类型
//!
//! 定义各业务域的错误类型，包括：
//! - ProjectError（项目错误）
//! - StepError（步骤错误）
//! - ToolOutputError（工具输出错误）
//! - AuthError（认证错误）
//! - GenerationError（AI 生成错误）
//! - CompareError（项目对比错误）
//!
//! ## 设计原则
//! - 使用 thiserror 派生 Error trait
//! - 支持 From 转换以便错误传播
//! - 实现 Serialize 以便直接写入 JSON 响应

use thiserror::Error;

// ============================================================================
// 项目错误
// ============================================================================

/// 项目操作错误
///
/// 涵盖项目 CRUD 及所有权校验中可能出现的错误情况。
#[derive(Error, Debug)]
pub enum ProjectError {
    /// 项目不存在
    #[error("项目不存在: {0}")]
    NotFound(String),

    /// 无权访问该项目
    #[error("无权访问该项目: {0}")]
    Forbidden(String),

    /// 请求参数无效
    #[error("请求参数无效: {0}")]
    Validation(String),

    /// 可选功能尚未开通
    #[error("功能尚未开通: {0}，请先执行对应迁移")]
    FeatureUnavailable(String),

    /// 数据库错误
    #[error("数据库错误: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// 步骤存储错误
    #[error("步骤存储错误: {0}")]
    Step(#[from] StepError),
}

impl From<ProjectError> for String {
    fn from(err: ProjectError) -> Self {
        err.to_string()
    }
}

impl serde::Serialize for ProjectError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// 步骤错误
// ============================================================================

/// 步骤操作错误
///
/// 涵盖步骤惰性创建、输入写入、输出读写中可能出现的错误情况。
#[derive(Error, Debug)]
pub enum StepError {
    /// 步骤不存在
    #[error("步骤不存在: {0}")]
    NotFound(String),

    /// 未知的步骤 key
    #[error("未知的步骤 key: {0}")]
    UnknownStepKey(String),

    /// 请求参数无效
    #[error("请求参数无效: {0}")]
    Validation(String),

    /// 项目不存在
    #[error("项目不存在: {0}")]
    ProjectNotFound(String),

    /// 数据库错误
    #[error("数据库错误: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// JSON 编解码错误
    #[error("JSON 编解码错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<StepError> for String {
    fn from(err: StepError) -> Self {
        err.to_string()
    }
}

impl serde::Serialize for StepError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// 工具输出错误
// ============================================================================

/// 工具输出操作错误
#[derive(Error, Debug)]
pub enum ToolOutputError {
    /// 工具输出不存在
    #[error("工具输出不存在: {0}")]
    NotFound(String),

    /// 项目不存在
    #[error("项目不存在: {0}")]
    ProjectNotFound(String),

    /// 数据库错误
    #[error("数据库错误: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// JSON 编解码错误
    #[error("JSON 编解码错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<ToolOutputError> for String {
    fn from(err: ToolOutputError) -> Self {
        err.to_string()
    }
}

impl serde::Serialize for ToolOutputError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// 认证错误
// ============================================================================

/// 认证操作错误
///
/// 涵盖注册、登录、token 校验中可能出现的错误情况。
#[derive(Error, Debug)]
pub enum AuthError {
    /// 缺少或无效的 bearer token
    #[error("未认证或 token 无效")]
    Unauthorized,

    /// 邮箱或密码错误
    #[error("邮箱或密码错误")]
    InvalidCredentials,

    /// 邮箱已注册
    #[error("邮箱已注册: {0}")]
    EmailAlreadyRegistered(String),

    /// 请求参数无效
    #[error("请求参数无效: {0}")]
    Validation(String),

    /// 数据库错误
    #[error("数据库错误: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

impl From<AuthError> for String {
    fn from(err: AuthError) -> Self {
        err.to_string()
    }
}

impl serde::Serialize for AuthError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// AI 生成错误
// ============================================================================

/// AI 生成错误
///
/// 涵盖提示词构建、补全调用、JSON 解析与一次修复重试中
/// 可能出现的错误情况。修复重试失败后不再重试。
#[derive(Error, Debug)]
pub enum GenerationError {
    /// 模型输出无法解析（含一次修复重试后仍失败）
    #[error("模型输出无法解析为 JSON")]
    GenerationFailed,

    /// 上游补全服务返回错误
    #[error("上游补全服务错误: {0}")]
    Upstream(String),

    /// 步骤输入不完整，无法构建提示词
    #[error("步骤输入不完整: 缺少 {0}")]
    IncompleteInputs(String),

    /// 未知的步骤 key
    #[error("未知的步骤 key: {0}")]
    UnknownStepKey(String),

    /// 数据库错误
    #[error("数据库错误: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// 步骤存储错误
    #[error("步骤存储错误: {0}")]
    Step(#[from] StepError),
}

impl From<GenerationError> for String {
    fn from(err: GenerationError) -> Self {
        err.to_string()
    }
}

impl serde::Serialize for GenerationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// 项目对比错误
// ============================================================================

/// 项目对比错误
#[derive(Error, Debug)]
pub enum CompareError {
    /// 项目数量超出 2-5 范围
    #[error("对比项目数量必须在 2 到 5 之间，收到 {0}")]
    InvalidProjectCount(usize),

    /// 项目不存在
    #[error("项目不存在: {0}")]
    ProjectNotFound(String),

    /// 无权访问该项目
    #[error("无权访问该项目: {0}")]
    Forbidden(String),

    /// 数据库错误
    #[error("数据库错误: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// 步骤存储错误
    #[error("步骤存储错误: {0}")]
    Step(#[from] StepError),
}

impl From<CompareError> for String {
    fn from(err: CompareError) -> Self {
        err.to_string()
    }
}

impl serde::Serialize for CompareError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_error_display() {
        let err = ProjectError::NotFound("p-1".to_string());
        assert_eq!(err.to_string(), "项目不存在: p-1");

        let err = ProjectError::Forbidden("p-1".to_string());
        assert_eq!(err.to_string(), "无权访问该项目: p-1");

        let err = ProjectError::FeatureUnavailable("folders".to_string());
        assert!(err.to_string().contains("folders"));
        assert!(err.to_string().contains("迁移"));
    }

    #[test]
    fn test_step_error_display() {
        let err = StepError::UnknownStepKey("bogus".to_string());
        assert_eq!(err.to_string(), "未知的步骤 key: bogus");
    }

    #[test]
    fn test_auth_error_display() {
        assert_eq!(AuthError::Unauthorized.to_string(), "未认证或 token 无效");
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "邮箱或密码错误"
        );
        let err = AuthError::EmailAlreadyRegistered("a@b.c".to_string());
        assert_eq!(err.to_string(), "邮箱已注册: a@b.c");
    }

    #[test]
    fn test_generation_error_display() {
        assert_eq!(
            GenerationError::GenerationFailed.to_string(),
            "模型输出无法解析为 JSON"
        );
        let err = GenerationError::Upstream("429 Too Many Requests".to_string());
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_compare_error_display() {
        let err = CompareError::InvalidProjectCount(1);
        assert!(err.to_string().contains("2 到 5"));
        assert!(err.to_string().contains('1'));
    }

    #[test]
    fn test_error_to_string_conversion() {
        let s: String = ProjectError::NotFound("x".to_string()).into();
        assert_eq!(s, "项目不存在: x");

        let s: String = GenerationError::GenerationFailed.into();
        assert_eq!(s, "模型输出无法解析为 JSON");
    }

    #[test]
    fn test_error_serialize() {
        let err = AuthError::Unauthorized;
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"未认证或 token 无效\"");
    }
}
