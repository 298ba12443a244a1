//! 领域错误到 HTTP 响应的映射
//!
//! 每个领域错误映射到统一的 `ApiErrorResponse` JSON 信封，
//! 状态码由错误码决定。映射只在这里做一次，handler 全部用 `?`。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use toolthinker_core::errors::api_error::{ApiError, ApiErrorCode, ApiErrorResponse};
use toolthinker_core::errors::domain_error::{
    AuthError, CompareError, GenerationError, ProjectError, StepError, ToolOutputError,
};

/// handler 的统一返回错误
#[derive(Debug)]
pub struct ApiFailure(pub ApiError);

pub type ApiResult<T> = Result<T, ApiFailure>;

impl ApiFailure {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self(ApiError::new(code, message))
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.code.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ApiErrorResponse::new(self.0))).into_response()
    }
}

impl From<ProjectError> for ApiFailure {
    fn from(err: ProjectError) -> Self {
        let code = match &err {
            ProjectError::NotFound(_) => ApiErrorCode::NotFound,
            ProjectError::Forbidden(_) => ApiErrorCode::Forbidden,
            ProjectError::Validation(_) => ApiErrorCode::ValidationError,
            ProjectError::FeatureUnavailable(_) => ApiErrorCode::UpstreamUnavailable,
            ProjectError::DatabaseError(_) | ProjectError::Step(_) => {
                tracing::error!("项目操作内部错误: {err}");
                ApiErrorCode::InternalError
            }
        };
        Self::new(code, err.to_string())
    }
}

impl From<StepError> for ApiFailure {
    fn from(err: StepError) -> Self {
        let code = match &err {
            StepError::NotFound(_) | StepError::ProjectNotFound(_) => ApiErrorCode::NotFound,
            StepError::UnknownStepKey(_) | StepError::Validation(_) => {
                ApiErrorCode::ValidationError
            }
            StepError::DatabaseError(_) | StepError::JsonError(_) => {
                tracing::error!("步骤操作内部错误: {err}");
                ApiErrorCode::InternalError
            }
        };
        Self::new(code, err.to_string())
    }
}

impl From<ToolOutputError> for ApiFailure {
    fn from(err: ToolOutputError) -> Self {
        let code = match &err {
            ToolOutputError::NotFound(_) | ToolOutputError::ProjectNotFound(_) => {
                ApiErrorCode::NotFound
            }
            ToolOutputError::DatabaseError(_) | ToolOutputError::JsonError(_) => {
                tracing::error!("工具输出内部错误: {err}");
                ApiErrorCode::InternalError
            }
        };
        Self::new(code, err.to_string())
    }
}

impl From<AuthError> for ApiFailure {
    fn from(err: AuthError) -> Self {
        let code = match &err {
            AuthError::Unauthorized | AuthError::InvalidCredentials => ApiErrorCode::Unauthorized,
            AuthError::EmailAlreadyRegistered(_) | AuthError::Validation(_) => {
                ApiErrorCode::ValidationError
            }
            AuthError::DatabaseError(_) => {
                tracing::error!("认证内部错误: {err}");
                ApiErrorCode::InternalError
            }
        };
        Self::new(code, err.to_string())
    }
}

impl From<GenerationError> for ApiFailure {
    fn from(err: GenerationError) -> Self {
        let code = match &err {
            GenerationError::GenerationFailed => ApiErrorCode::GenerationFailed,
            GenerationError::Upstream(_) => ApiErrorCode::UpstreamUnavailable,
            GenerationError::IncompleteInputs(_) | GenerationError::UnknownStepKey(_) => {
                ApiErrorCode::ValidationError
            }
            GenerationError::DatabaseError(_) | GenerationError::Step(_) => {
                tracing::error!("生成流程内部错误: {err}");
                ApiErrorCode::InternalError
            }
        };
        Self::new(code, err.to_string())
    }
}

impl From<CompareError> for ApiFailure {
    fn from(err: CompareError) -> Self {
        let code = match &err {
            CompareError::InvalidProjectCount(_) => ApiErrorCode::ValidationError,
            CompareError::ProjectNotFound(_) => ApiErrorCode::NotFound,
            CompareError::Forbidden(_) => ApiErrorCode::Forbidden,
            CompareError::DatabaseError(_) | CompareError::Step(_) => {
                tracing::error!("项目对比内部错误: {err}");
                ApiErrorCode::InternalError
            }
        };
        Self::new(code, err.to_string())
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(failure: ApiFailure) -> StatusCode {
        failure.into_response().status()
    }

    #[test]
    fn test_project_error_statuses() {
        assert_eq!(
            status_of(ProjectError::NotFound("p".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ProjectError::Forbidden("p".into()).into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ProjectError::Validation("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ProjectError::FeatureUnavailable("folders".into()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            status_of(AuthError::Unauthorized.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::EmailAlreadyRegistered("a@b.c".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_step_error_statuses() {
        assert_eq!(
            status_of(StepError::Validation("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StepError::NotFound("s".into()).into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_generation_error_statuses() {
        assert_eq!(
            status_of(GenerationError::GenerationFailed.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(GenerationError::Upstream("503".into()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(GenerationError::IncompleteInputs("idea".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_compare_error_statuses() {
        assert_eq!(
            status_of(CompareError::InvalidProjectCount(1).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CompareError::ProjectNotFound("p".into()).into()),
            StatusCode::NOT_FOUND
        );
    }
}
