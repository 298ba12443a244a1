//! 咨询对话服务
//!
//! 带项目上下文的自由问答：把项目元信息和各步骤的有效输出
//! 拼进 system 指令。这里只做校验与消息组装（持锁阶段），
//! 补全调用由接口层在释放数据库锁后发起。

use rusqlite::Connection;
use serde::Deserialize;

use toolthinker_core::database::dao::step_dao::StepDao;
use toolthinker_core::database::dao::step_output_dao::StepOutputDao;
use toolthinker_core::errors::domain_error::GenerationError;
use toolthinker_core::frameworks;
use toolthinker_core::models::project_model::Project;

use crate::llm::ChatMessage;

/// 咨询请求
#[derive(Debug, Clone, Deserialize)]
pub struct ConsultationRequest {
    /// 对话历史（user / assistant 轮流），最后一条是当前提问
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
}

/// 拼装项目上下文
///
/// 只带有效输出（用户编辑版优先），按框架固定顺序。
fn build_context(conn: &Connection, project: &Project) -> Result<String, GenerationError> {
    let mut context = format!("Project: {}\n", project.name);
    if let Some(desc) = &project.description {
        if !desc.trim().is_empty() {
            context.push_str(&format!("Description: {desc}\n"));
        }
    }
    context.push_str(&format!("Status: {}\n", project.status.as_str()));

    for def in frameworks::all() {
        let Some(step) = StepDao::get_by_key(conn, &project.id, def.key)? else {
            continue;
        };
        if let Some(output) = StepOutputDao::get_by_step(conn, &step.id)? {
            context.push_str(&format!("\n## {}\n{}\n", def.title, output.effective()));
        }
    }
    Ok(context)
}

fn assemble_messages(context: &str, request: &ConsultationRequest) -> Vec<ChatMessage> {
    let system = format!(
        "You are a startup advisor helping a founder think through their project. \
         Answer concisely and concretely, grounded in the project context below.\n\n{context}"
    );
    let mut messages = vec![ChatMessage::system(system)];
    messages.extend(request.messages.iter().cloned());
    messages
}

fn validate(request: &ConsultationRequest) -> Result<(), GenerationError> {
    let has_question = request
        .messages
        .iter()
        .any(|m| m.role == "user" && !m.content.trim().is_empty());
    if !has_question {
        return Err(GenerationError::IncompleteInputs("question".to_string()));
    }
    Ok(())
}

/// 校验请求并组装待发送的消息序列（持锁阶段）
pub fn prepare_consultation(
    conn: &Connection,
    project: &Project,
    request: &ConsultationRequest,
) -> Result<Vec<ChatMessage>, GenerationError> {
    validate(request)?;
    let context = build_context(conn, project)?;
    Ok(assemble_messages(&context, request))
}

// ============================================================================
// 测试
// ============================================================================
