//! SSE 响应构建
//!
//! 把补全文本流包装成 text/event-stream 响应：每块一条
//! `data: {"delta": ...}` 事件，出错降级为 error 事件，
//! 末尾固定一条 `[DONE]`。

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::json;

use toolthinker_core::errors::domain_error::GenerationError;

/// 把文本块流包装成 SSE 响应
pub fn text_stream_response(stream: BoxStream<'static, Result<String, GenerationError>>) -> Response {
    let events = stream
        .map(|chunk| {
            let payload = match chunk {
                Ok(delta) => json!({"delta": delta}),
                Err(e) => {
                    tracing::warn!("流式回复中断: {e}");
                    json!({"error": e.to_string()})
                }
            };
            Ok::<_, std::convert::Infallible>(format!("data: {payload}\n\n"))
        })
        .chain(futures::stream::once(async {
            Ok("data: [DONE]\n\n".to_string())
        }));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(events))
        .unwrap_or_else(|e| {
            tracing::error!("构建 SSE 响应失败: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}
