//! AI 文档生成服务
//!
//! 把步骤输入渲染成提示词，调用补全客户端，把模型输出解析为
//! JSON 对象后落库。解析失败时带着原始输出追加一次修复请求，
//! 修复仍失败则报 GenerationFailed，不再重试。
//!
//! 流程拆成三段：prepare（读库，组装提示词）、run（调补全，
//! 不碰库）、persist（写库）。接口层在 run 阶段不持有数据库锁，
//! 补全往返期间其他请求照常读写。

use futures::stream::BoxStream;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use toolthinker_core::database::dao::step_dao::StepDao;
use toolthinker_core::database::dao::step_input_dao::StepInputDao;
use toolthinker_core::database::dao::step_output_dao::StepOutputDao;
use toolthinker_core::errors::domain_error::GenerationError;
use toolthinker_core::frameworks::{self, FrameworkDef};
use toolthinker_core::models::step_model::{Step, StepOutput, StepStatus};

use crate::llm::{ChatMessage, CompletionClient};
use crate::project_service::record_activity;

const SYSTEM_PROMPT: &str = "You are a startup planning assistant. \
Respond with a single JSON object and nothing else: no prose, no code fences.";

/// 已就绪的生成请求：步骤记录 + 组装好的提示消息
///
/// 由 `prepare_generation` 在持锁阶段构建，之后的补全调用
/// 不再需要数据库。
pub struct PendingGeneration {
    step: Step,
    def: &'static FrameworkDef,
    messages: Vec<ChatMessage>,
}

/// 剥掉模型常见的 Markdown 代码围栏
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return trimmed;
    };
    // 开头可能带语言标记（```json）
    let inner = match inner.split_once('\n') {
        Some((first_line, rest)) if first_line.trim().chars().all(|c| c.is_alphanumeric()) => rest,
        _ => inner,
    };
    inner.trim()
}

/// 解析模型输出为 JSON 对象；数组、标量或非法 JSON 都算失败
fn parse_output(text: &str) -> Option<serde_json::Value> {
    let cleaned = strip_code_fences(text);
    let value: serde_json::Value = serde_json::from_str(cleaned).ok()?;
    value.is_object().then_some(value)
}

/// 校验必答题并组装提示消息（持锁阶段）
pub fn prepare_generation(
    conn: &Connection,
    project_id: &str,
    step_key: &str,
) -> Result<PendingGeneration, GenerationError> {
    let def = frameworks::get(step_key)
        .ok_or_else(|| GenerationError::UnknownStepKey(step_key.to_string()))?;

    let step = StepDao::get_or_create(conn, project_id, step_key)?;
    let input = StepInputDao::get_by_step(conn, &step.id)?;
    let data = input.map(|i| i.data).unwrap_or_default();

    if !def.is_complete(&data) {
        let missing: Vec<&str> = def
            .questions
            .iter()
            .filter(|q| q.required)
            .filter(|q| match data.get(q.id) {
                Some(serde_json::Value::String(s)) => s.trim().is_empty(),
                Some(serde_json::Value::Null) | None => true,
                Some(_) => false,
            })
            .map(|q| q.id)
            .collect();
        return Err(GenerationError::IncompleteInputs(missing.join(", ")));
    }

    let prompt = def.build_prompt(&data);
    let messages = vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];
    Ok(PendingGeneration {
        step,
        def,
        messages,
    })
}

/// 调用补全客户端并解析输出（无锁阶段）
///
/// 解析失败时带着原始输出追加一次修复请求；修复仍失败
/// 报 GenerationFailed，恰好两次调用。
pub async fn run_generation(
    client: &dyn CompletionClient,
    pending: &PendingGeneration,
) -> Result<serde_json::Value, GenerationError> {
    let step = &pending.step;
    info!("生成步骤输出: {} / {}", step.project_id, step.step_key);
    let mut messages = pending.messages.clone();
    let first_reply = client.complete(&messages).await?;

    match parse_output(&first_reply) {
        Some(value) => Ok(value),
        None => {
            warn!(
                "模型输出解析失败，尝试修复: {} / {}",
                step.project_id, step.step_key
            );
            messages.push(ChatMessage::assistant(first_reply));
            messages.push(ChatMessage::user(format!(
                "Your previous reply was not a valid JSON object. \
                 Return only a JSON object with exactly these keys: {}.",
                pending.def.output_fields.join(", ")
            )));
            let second_reply = client.complete(&messages).await?;
            parse_output(&second_reply).ok_or(GenerationError::GenerationFailed)
        }
    }
}

/// 落库生成结果（持锁阶段）
///
/// 重新生成会递增 version 并清空用户编辑版。
pub fn persist_generation(
    conn: &Connection,
    pending: &PendingGeneration,
    value: &serde_json::Value,
) -> Result<StepOutput, GenerationError> {
    let step = &pending.step;
    debug!("步骤输出解析成功: {} / {}", step.project_id, step.step_key);
    let output = StepOutputDao::upsert_ai_output(conn, &step.id, value)?;

    if step.status == StepStatus::NotStarted {
        StepDao::mark_in_progress(conn, &step.id)?;
    }
    record_activity(conn, &step.project_id, "step.generated", Some(&step.step_key));
    Ok(output)
}

/// 流式生成步骤输出（无锁阶段）
///
/// 把补全文本按块原样转发，不做 JSON 校验也不落库；
/// 客户端断开即取消，块序列有限且不可重放。
pub async fn stream_generation(
    client: &dyn CompletionClient,
    pending: &PendingGeneration,
) -> Result<BoxStream<'static, Result<String, GenerationError>>, GenerationError> {
    let step = &pending.step;
    info!("流式生成步骤输出: {} / {}", step.project_id, step.step_key);
    client.complete_stream(&pending.messages).await
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockCompletionClient;
    use serde_json::json;
    use std::collections::HashMap;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        toolthinker_core::database::schema::create_tables(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (id, email, password_hash, salt, created_at)
             VALUES ('u1', 'a@b.c', 'h', 's', 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO projects (id, user_id, name, created_at, updated_at)
             VALUES ('p1', 'u1', 'P', 0, 0)",
            [],
        )
        .unwrap();
        conn
    }

    fn fill_required_inputs(conn: &Connection, step_key: &str) {
        let def = frameworks::get(step_key).unwrap();
        let mut data = HashMap::new();
        for q in def.questions.iter().filter(|q| q.required) {
            data.insert(q.id.to_string(), json!("a thoughtful answer"));
        }
        crate::step_service::update_inputs(conn, "p1", step_key, &data).unwrap();
    }

    fn valid_reply(step_key: &str) -> String {
        let def = frameworks::get(step_key).unwrap();
        let mut obj = serde_json::Map::new();
        for field in def.output_fields {
            obj.insert(field.to_string(), json!("generated text"));
        }
        serde_json::Value::Object(obj).to_string()
    }

    /// prepare / run / persist 串起来，与接口层同构
    async fn generate(
        conn: &Connection,
        client: &dyn CompletionClient,
        step_key: &str,
    ) -> Result<StepOutput, GenerationError> {
        let pending = prepare_generation(conn, "p1", step_key)?;
        let value = run_generation(client, &pending).await?;
        persist_generation(conn, &pending, &value)
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_output_requires_object() {
        assert!(parse_output("{\"a\": 1}").is_some());
        assert!(parse_output("[1, 2]").is_none());
        assert!(parse_output("\"just a string\"").is_none());
        assert!(parse_output("not json at all").is_none());
    }

    #[tokio::test]
    async fn test_generate_happy_path() {
        let conn = setup_test_db();
        fill_required_inputs(&conn, "idea_refinement");
        let client = MockCompletionClient::replying(&valid_reply("idea_refinement"));

        let output = generate(&conn, &client, "idea_refinement").await.unwrap();
        assert_eq!(output.version, 1);
        assert_eq!(client.call_count(), 1);
        assert!(output.ai_output.is_object());
    }

    #[tokio::test]
    async fn test_generate_repairs_once_then_succeeds() {
        let conn = setup_test_db();
        fill_required_inputs(&conn, "idea_refinement");
        let client = MockCompletionClient::new(vec![
            Ok("I think the answer is...".to_string()),
            Ok(valid_reply("idea_refinement")),
        ]);

        let output = generate(&conn, &client, "idea_refinement").await.unwrap();
        assert_eq!(client.call_count(), 2);
        assert_eq!(output.version, 1);

        // 修复请求带上了原始输出
        let calls = client.calls.lock().unwrap();
        let repair_messages = &calls[1];
        assert!(repair_messages
            .iter()
            .any(|m| m.role == "assistant" && m.content.contains("I think")));
    }

    #[tokio::test]
    async fn test_generate_fails_after_two_attempts() {
        let conn = setup_test_db();
        fill_required_inputs(&conn, "idea_refinement");
        let client = MockCompletionClient::new(vec![
            Ok("nonsense".to_string()),
            Ok("still nonsense".to_string()),
        ]);

        let result = generate(&conn, &client, "idea_refinement").await;
        assert!(matches!(result, Err(GenerationError::GenerationFailed)));
        // 恰好两次调用，不再重试
        assert_eq!(client.call_count(), 2);

        // 失败不落库
        let step = StepDao::get_by_key(&conn, "p1", "idea_refinement")
            .unwrap()
            .unwrap();
        assert!(StepOutputDao::get_by_step(&conn, &step.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generate_rejects_incomplete_inputs() {
        let conn = setup_test_db();
        let client = MockCompletionClient::replying("{}");

        let result = generate(&conn, &client, "idea_refinement").await;
        assert!(matches!(result, Err(GenerationError::IncompleteInputs(_))));
        // 输入不完整时不调用模型
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_regenerate_bumps_version_and_clears_edit() {
        let conn = setup_test_db();
        fill_required_inputs(&conn, "idea_refinement");

        let client = MockCompletionClient::replying(&valid_reply("idea_refinement"));
        generate(&conn, &client, "idea_refinement").await.unwrap();

        crate::step_service::set_user_edited_output(
            &conn,
            "p1",
            "idea_refinement",
            &json!({"problem_statement": "my own words"}),
        )
        .unwrap();

        let client = MockCompletionClient::replying(&valid_reply("idea_refinement"));
        let output = generate(&conn, &client, "idea_refinement").await.unwrap();
        assert_eq!(output.version, 2);
        assert!(output.user_edited_output.is_none());
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let conn = setup_test_db();
        fill_required_inputs(&conn, "idea_refinement");
        let client = MockCompletionClient::new(vec![Err(GenerationError::Upstream(
            "503 Service Unavailable".to_string(),
        ))]);

        let result = generate(&conn, &client, "idea_refinement").await;
        assert!(matches!(result, Err(GenerationError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_stream_forwards_chunks_without_persisting() {
        use futures::StreamExt;

        let conn = setup_test_db();
        fill_required_inputs(&conn, "idea_refinement");
        let client = MockCompletionClient::replying("raw completion text");

        let pending = prepare_generation(&conn, "p1", "idea_refinement").unwrap();
        let stream = stream_generation(&client, &pending).await.unwrap();
        let parts: Vec<String> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(parts.join(""), "raw completion text");

        // 流式路径不落库
        let step = StepDao::get_or_create(&conn, "p1", "idea_refinement").unwrap();
        assert!(StepOutputDao::get_by_step(&conn, &step.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stream_requires_complete_inputs() {
        let conn = setup_test_db();
        let client = MockCompletionClient::replying("unused");

        let result = prepare_generation(&conn, "p1", "idea_refinement");
        assert!(matches!(result, Err(GenerationError::IncompleteInputs(_))));
        assert_eq!(client.call_count(), 0);
    }
}
