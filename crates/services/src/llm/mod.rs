//! 补全客户端抽象
//!
//! 生成服务与咨询服务只依赖 `CompletionClient` trait，
//! 生产环境走 OpenAI 兼容接口，测试用脚本化的 mock 实现。

pub mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use toolthinker_core::errors::domain_error::GenerationError;

/// 聊天消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// 补全客户端
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// 非流式补全，返回完整文本
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GenerationError>;

    /// 流式补全，逐段返回增量文本
    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<BoxStream<'static, Result<String, GenerationError>>, GenerationError>;
}
