//! OpenAI 兼容补全客户端
//!
//! 走 `/chat/completions` 接口，兼容任何 OpenAI 协议的服务端。
//! 流式模式解析 SSE 增量，`data: [DONE]` 为结束标记。

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use toolthinker_core::config::CompletionConfig;
use toolthinker_core::errors::domain_error::GenerationError;

use super::{ChatMessage, CompletionClient};

// ============================================================================
// 请求 / 响应结构
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

// ============================================================================
// 客户端
// ============================================================================

/// OpenAI 兼容客户端
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    fn request_builder(&self, body: &ChatCompletionRequest<'_>) -> reqwest::RequestBuilder {
        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }
}

/// 解析单行 SSE 数据的增量文本；非 JSON 或无内容的增量返回 None
fn parse_sse_data(data: &str) -> Option<String> {
    let chunk: StreamChunk = serde_json::from_str(data).ok()?;
    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            stream: false,
        };
        debug!("补全请求: model={}, messages={}", self.model, messages.len());

        let response = self
            .request_builder(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Upstream(format!("请求失败: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream(format!("{status}: {body}")));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Upstream(format!("响应解析失败: {e}")))?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<BoxStream<'static, Result<String, GenerationError>>, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            stream: true,
        };

        let response = self
            .request_builder(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Upstream(format!("请求失败: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream(format!("{status}: {body}")));
        }

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut buf = String::new();
            let mut done = false;
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(GenerationError::Upstream(format!("流读取失败: {e}")));
                        break;
                    }
                };
                buf.push_str(&String::from_utf8_lossy(&chunk));

                // SSE 事件以空行分隔
                while let Some(pos) = buf.find("\n\n") {
                    let event: String = buf.drain(..pos + 2).collect();
                    for line in event.lines() {
                        if let Some(data) = line.strip_prefix("data:") {
                            let data = data.trim_start();
                            if data == "[DONE]" {
                                done = true;
                            } else if let Some(delta) = parse_sse_data(data) {
                                if !delta.is_empty() {
                                    yield Ok(delta);
                                }
                            }
                        }
                    }
                    if done {
                        break;
                    }
                }
                if done {
                    break;
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
