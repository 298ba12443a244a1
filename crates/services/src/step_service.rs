//! 步骤服务
//!
//! 工作流步骤的惰性创建、输入写入与完成。所有权校验由调用方
//! （接口层）先行完成，这里只做步骤 key 与步骤状态的业务规则。

use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

use toolthinker_core::database::dao::step_dao::StepDao;
use toolthinker_core::database::dao::step_input_dao::StepInputDao;
use toolthinker_core::database::dao::step_output_dao::StepOutputDao;
use toolthinker_core::errors::domain_error::StepError;
use toolthinker_core::frameworks;
use toolthinker_core::models::step_model::{Step, StepInput, StepOutput, StepStatus};

use crate::project_service::record_activity;

/// 步骤详情：步骤本体 + 当前输入 + 输出
#[derive(Debug, Clone, Serialize)]
pub struct StepDetail {
    #[serde(flatten)]
    pub step: Step,
    /// 框架标题
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<StepInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<StepOutput>,
    /// 必答题是否都已回答
    pub inputs_complete: bool,
}

fn validate_key(step_key: &str) -> Result<&'static frameworks::FrameworkDef, StepError> {
    frameworks::get(step_key).ok_or_else(|| StepError::UnknownStepKey(step_key.to_string()))
}

fn build_detail(conn: &Connection, step: Step) -> Result<StepDetail, StepError> {
    let def = validate_key(&step.step_key)?;
    let input = StepInputDao::get_by_step(conn, &step.id)?;
    let output = StepOutputDao::get_by_step(conn, &step.id)?;
    let inputs_complete = input
        .as_ref()
        .map(|i| def.is_complete(&i.data))
        .unwrap_or(false);
    Ok(StepDetail {
        step,
        title: def.title,
        input,
        output,
        inputs_complete,
    })
}

/// 获取或创建步骤（幂等）
///
/// 未知 key 直接拒绝，不落库。
pub fn get_or_create_step(
    conn: &Connection,
    project_id: &str,
    step_key: &str,
) -> Result<StepDetail, StepError> {
    validate_key(step_key)?;
    let step = StepDao::get_or_create(conn, project_id, step_key)?;
    build_detail(conn, step)
}

/// 写入步骤输入（整条替换）
///
/// 写入后步骤进入进行中；已完成的步骤保持完成状态，
/// 只更新输入内容。
pub fn update_inputs(
    conn: &Connection,
    project_id: &str,
    step_key: &str,
    data: &HashMap<String, serde_json::Value>,
) -> Result<StepDetail, StepError> {
    validate_key(step_key)?;
    let step = StepDao::get_or_create(conn, project_id, step_key)?;
    StepInputDao::replace(conn, &step.id, data)?;

    let step = if step.status == StepStatus::Completed {
        step
    } else {
        StepDao::mark_in_progress(conn, &step.id)?
    };
    record_activity(conn, project_id, "step.inputs_updated", Some(step_key));
    build_detail(conn, step)
}

/// 写入用户编辑版输出
///
/// 只接受 JSON 对象（与 AI 版同构）；不改 version，不动 AI 版；
/// 尚无输出时报 NotFound。
pub fn set_user_edited_output(
    conn: &Connection,
    project_id: &str,
    step_key: &str,
    edited: &serde_json::Value,
) -> Result<StepDetail, StepError> {
    validate_key(step_key)?;
    if !edited.is_object() {
        return Err(StepError::Validation(
            "用户编辑版输出必须是 JSON 对象".to_string(),
        ));
    }
    let step = StepDao::get_or_create(conn, project_id, step_key)?;
    StepOutputDao::set_user_edited(conn, &step.id, edited)?;
    record_activity(conn, project_id, "step.output_edited", Some(step_key));
    build_detail(conn, step)
}

/// 标记步骤完成
pub fn complete_step(
    conn: &Connection,
    project_id: &str,
    step_key: &str,
) -> Result<StepDetail, StepError> {
    validate_key(step_key)?;
    let step = StepDao::get_or_create(conn, project_id, step_key)?;
    let step = StepDao::mark_completed(conn, &step.id)?;
    record_activity(conn, project_id, "step.completed", Some(step_key));
    build_detail(conn, step)
}

/// 项目的全部步骤详情，按框架固定顺序
///
/// 未创建过的步骤不出现在结果里。
pub fn list_steps(conn: &Connection, project_id: &str) -> Result<Vec<StepDetail>, StepError> {
    let steps = StepDao::list_by_project(conn, project_id)?;
    let by_key: HashMap<String, Step> =
        steps.into_iter().map(|s| (s.step_key.clone(), s)).collect();

    let mut details = Vec::new();
    for key in frameworks::step_keys() {
        if let Some(step) = by_key.get(key) {
            details.push(build_detail(conn, step.clone())?);
        }
    }
    Ok(details)
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use toolthinker_core::database::schema::create_tables;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
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

    #[test]
    fn test_unknown_key_rejected_without_insert() {
        let conn = setup_test_db();
        let result = get_or_create_step(&conn, "p1", "bogus");
        assert!(matches!(result, Err(StepError::UnknownStepKey(_))));
        assert!(list_steps(&conn, "p1").unwrap().is_empty());
    }

    #[test]
    fn test_get_or_create_idempotent() {
        let conn = setup_test_db();
        let first = get_or_create_step(&conn, "p1", "idea_refinement").unwrap();
        let second = get_or_create_step(&conn, "p1", "idea_refinement").unwrap();
        assert_eq!(first.step.id, second.step.id);
        assert_eq!(first.step.status, StepStatus::NotStarted);
    }

    #[test]
    fn test_update_inputs_marks_in_progress() {
        let conn = setup_test_db();
        let mut data = HashMap::new();
        data.insert("idea".to_string(), json!("marketplace"));

        let detail = update_inputs(&conn, "p1", "idea_refinement", &data).unwrap();
        assert_eq!(detail.step.status, StepStatus::InProgress);
        assert!(detail.step.started_at.is_some());
        assert_eq!(
            detail.input.unwrap().data.get("idea"),
            Some(&json!("marketplace"))
        );
    }

    #[test]
    fn test_update_inputs_keeps_completed_status() {
        let conn = setup_test_db();
        complete_step(&conn, "p1", "idea_refinement").unwrap();

        let mut data = HashMap::new();
        data.insert("idea".to_string(), json!("revised"));
        let detail = update_inputs(&conn, "p1", "idea_refinement", &data).unwrap();
        assert_eq!(detail.step.status, StepStatus::Completed);
    }

    #[test]
    fn test_set_user_edited_requires_output() {
        let conn = setup_test_db();
        let result = set_user_edited_output(&conn, "p1", "idea_refinement", &json!({"x": "1"}));
        assert!(matches!(result, Err(StepError::NotFound(_))));
    }

    #[test]
    fn test_set_user_edited_rejects_non_object() {
        let conn = setup_test_db();
        for bad in [json!("just a string"), json!(["a", "b"]), json!(42)] {
            let result = set_user_edited_output(&conn, "p1", "idea_refinement", &bad);
            assert!(matches!(result, Err(StepError::Validation(_))));
        }
        // 校验先于惰性创建，不落库
        assert!(list_steps(&conn, "p1").unwrap().is_empty());
    }

    #[test]
    fn test_list_steps_follows_framework_order() {
        let conn = setup_test_db();
        // 乱序创建
        get_or_create_step(&conn, "p1", "lean_canvas").unwrap();
        get_or_create_step(&conn, "p1", "idea_refinement").unwrap();

        let details = list_steps(&conn, "p1").unwrap();
        let keys: Vec<&str> = details.iter().map(|d| d.step.step_key.as_str()).collect();
        assert_eq!(keys, vec!["idea_refinement", "lean_canvas"]);
    }
}
