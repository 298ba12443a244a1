//! Tool Thinker 服务入口
//!
//! 加载配置、打开数据库、构建应用状态并启动 HTTP 服务。

use std::sync::Arc;

use anyhow::Context;
use rusqlite::Connection;
use tracing::info;

use toolthinker_core::config::{self, Config};
use toolthinker_core::database::dao::share_link_dao::ShareLinkDao;
use toolthinker_core::database::dao::user_dao::SessionDao;
use toolthinker_core::database::schema::create_tables;
use toolthinker_server::{build_router, AppState};
use toolthinker_services::llm::openai::OpenAiClient;
use toolthinker_services::mailer::{HttpMailer, Mailer, NoopMailer};

fn open_database(config: &Config) -> anyhow::Result<Connection> {
    let path = config.database_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("创建数据目录失败: {parent:?}"))?;
    }
    let conn = Connection::open(&path).with_context(|| format!("打开数据库失败: {path:?}"))?;
    create_tables(&conn).context("初始化数据库表失败")?;

    // 启动时清掉过期的会话与分享链接
    let now = chrono::Utc::now().timestamp();
    let sessions = SessionDao::purge_expired(&conn, now)
        .map_err(|e| anyhow::anyhow!("清理过期会话失败: {e}"))?;
    let links = ShareLinkDao::purge_expired(&conn, now)
        .map_err(|e| anyhow::anyhow!("清理过期分享链接失败: {e}"))?;
    if sessions + links > 0 {
        info!("启动清理: 过期会话 {sessions} 条，过期分享链接 {links} 条");
    }

    info!("数据库就绪: {path:?}");
    Ok(conn)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,toolthinker=debug".into()),
        )
        .init();

    let config = config::load_config().map_err(|e| anyhow::anyhow!("加载配置失败: {e}"))?;
    let conn = open_database(&config)?;

    let completion = Arc::new(OpenAiClient::new(&config.completion));
    let mailer: Arc<dyn Mailer> = match HttpMailer::from_config(&config.mail) {
        Some(mailer) => Arc::new(mailer),
        None => {
            info!("邮件服务未配置，使用空实现");
            Arc::new(NoopMailer)
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(conn, completion, mailer, config);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("监听地址失败: {addr}"))?;
    info!("Tool Thinker 服务启动: http://{addr}");

    axum::serve(listener, router).await.context("服务异常退出")?;
    Ok(())
}
