//! 邮件发送抽象
//!
//! 事务性邮件（密码重置等）走 HTTP API。发送永远是尽力而为：
//! 调用方吞掉错误，只打日志。

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use toolthinker_core::config::MailConfig;

/// 邮件发送器
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String>;
}

/// 未配置邮件服务时的空实现
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), String> {
        debug!("邮件服务未启用，丢弃邮件: to={to}, subject={subject}");
        Ok(())
    }
}

#[derive(Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// HTTP API 邮件发送器
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    /// 按配置构建；endpoint 缺失时返回 None，调用方退回 Noop
    pub fn from_config(config: &MailConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let endpoint = config.endpoint.clone()?;
        Some(Self {
            client: Client::new(),
            endpoint,
            api_key: config.api_key.clone(),
            from: config
                .from
                .clone()
                .unwrap_or_else(|| "noreply@toolthinker.local".to_string()),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        let request = MailRequest {
            from: &self.from,
            to,
            subject,
            text: body,
        };
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| format!("邮件请求失败: {e}"))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("邮件服务返回 {status}: {body}"));
        }
        info!("邮件已发送: to={to}, subject={subject}");
        Ok(())
    }
}
