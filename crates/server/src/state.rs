//! 服务器共享状态

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use toolthinker_core::config::Config;
use toolthinker_services::llm::CompletionClient;
use toolthinker_services::mailer::Mailer;

/// 全部 handler 共享的应用状态
///
/// SQLite 连接由异步互斥锁串行化，业务层拿 `&Connection` 工作。
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub completion: Arc<dyn CompletionClient>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        conn: Connection,
        completion: Arc<dyn CompletionClient>,
        mailer: Arc<dyn Mailer>,
        config: Config,
    ) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            completion,
            mailer,
            config: Arc::new(config),
        }
    }
}
