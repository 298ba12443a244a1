//! HTTP 接口层
//!
//! 路由组装、bearer 认证与领域错误到响应的映射。
//! 业务逻辑在 `toolthinker-services`，这里只做 HTTP 进出。

use std::time::Duration;

use axum::{
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

pub mod auth;
pub mod error;
pub mod routes;
pub mod sse;
pub mod state;

pub use state::AppState;

/// 请求体上限：2 MB
const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// 健康检查端点响应
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 组装完整路由
///
/// `/health` 与 `/api/shared/:token` 是公开接口，其余 `/api/*`
/// 路由在 handler 内做 bearer 认证。
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // 认证
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/password-reset", post(routes::auth::password_reset))
        // 项目
        .route(
            "/projects",
            get(routes::projects::list).post(routes::projects::create),
        )
        .route("/projects/compare", post(routes::projects::compare))
        .route(
            "/projects/:id",
            get(routes::projects::get)
                .patch(routes::projects::update)
                .delete(routes::projects::delete),
        )
        .route("/projects/:id/activity", get(routes::projects::activity))
        .route(
            "/projects/:id/notes",
            get(routes::projects::list_notes).post(routes::projects::add_note),
        )
        .route(
            "/projects/:id/notes/:note_id",
            delete(routes::projects::delete_note),
        )
        .route(
            "/projects/:id/tags",
            get(routes::projects::list_tags).post(routes::projects::add_tag),
        )
        .route(
            "/projects/:id/tags/:label",
            delete(routes::projects::remove_tag),
        )
        .route("/projects/:id/duplicate", post(routes::projects::duplicate))
        .route("/projects/:id/export", get(routes::projects::export))
        // 工作流步骤
        .route("/projects/:id/steps", get(routes::steps::list))
        .route(
            "/projects/:id/steps/:step_key",
            get(routes::steps::get_or_create),
        )
        .route(
            "/projects/:id/steps/:step_key/inputs",
            put(routes::steps::update_inputs),
        )
        .route(
            "/projects/:id/steps/:step_key/output",
            put(routes::steps::set_user_output),
        )
        .route(
            "/projects/:id/steps/:step_key/complete",
            post(routes::steps::complete),
        )
        .route(
            "/projects/:id/steps/:step_key/generate",
            post(routes::steps::generate),
        )
        // 咨询
        .route("/projects/:id/consult", post(routes::consultation::consult))
        // 分享
        .route(
            "/projects/:id/share",
            post(routes::share::create).delete(routes::share::revoke),
        )
        .route("/shared/:token", get(routes::share::resolve))
        // 工具输出
        .route(
            "/projects/:id/tools",
            get(routes::tools::list).put(routes::tools::upsert),
        )
        .route(
            "/projects/:id/tools/:tool_key",
            get(routes::tools::get).delete(routes::tools::delete),
        )
        // 可选功能
        .route(
            "/projects/:id/reminders",
            get(routes::optional::list_reminders).post(routes::optional::create_reminder),
        )
        .route(
            "/projects/:id/reminders/:reminder_id",
            delete(routes::optional::delete_reminder),
        )
        .route(
            "/folders",
            get(routes::optional::list_folders).post(routes::optional::create_folder),
        )
        .route("/folders/:id", delete(routes::optional::delete_folder))
        .route("/admin/migrate-optional", post(routes::optional::migrate))
        // 搜索与统计
        .route("/search", get(routes::projects::search))
        .route("/analytics/portfolio", get(routes::projects::portfolio));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(120)))
        .with_state(state)
}

// ============================================================================
// 测试
// ============================================================================
