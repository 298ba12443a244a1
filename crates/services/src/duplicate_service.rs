//! 项目复制服务
//!
//! 深拷贝一个项目：步骤（含状态与起止时间）、当前输入、
//! 输出（AI 版与用户编辑版都带上，version 重置为 1）。
//! 标签复制尽力而为，失败不影响主流程。

use rusqlite::Connection;
use tracing::warn;

use toolthinker_core::database::dao::project_dao::ProjectDao;
use toolthinker_core::database::dao::step_dao::StepDao;
use toolthinker_core::database::dao::step_input_dao::StepInputDao;
use toolthinker_core::database::dao::step_output_dao::StepOutputDao;
use toolthinker_core::database::dao::tag_dao::TagDao;
use toolthinker_core::errors::domain_error::ProjectError;
use toolthinker_core::frameworks;
use toolthinker_core::models::project_model::{CreateProjectRequest, Project, ProjectUpdate};

use crate::project_service::{load_owned_project, record_activity};

/// 复制项目
///
/// 新项目名默认带 " (Copy)" 后缀，调用方可传入自定义名字覆盖；
/// 状态与优先级沿用原项目。
pub fn duplicate_project(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
    name: Option<&str>,
) -> Result<Project, ProjectError> {
    let source = load_owned_project(conn, project_id, user_id)?;

    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => format!("{} (Copy)", source.name),
    };
    let copy = ProjectDao::create(
        conn,
        user_id,
        &CreateProjectRequest {
            name,
            description: source.description.clone(),
            priority: Some(source.priority),
        },
    )?;
    let copy = ProjectDao::update(
        conn,
        &copy.id,
        &ProjectUpdate {
            status: Some(source.status),
            ..Default::default()
        },
    )?;

    // 步骤按框架固定顺序逐个复制
    for key in frameworks::step_keys() {
        let Some(step) = StepDao::get_by_key(conn, &source.id, key)? else {
            continue;
        };
        let new_step = StepDao::insert_copy(conn, &copy.id, &step)?;

        if let Some(input) = StepInputDao::get_by_step(conn, &step.id)? {
            StepInputDao::replace(conn, &new_step.id, &input.data)?;
        }
        if let Some(output) = StepOutputDao::get_by_step(conn, &step.id)? {
            StepOutputDao::insert_seed(
                conn,
                &new_step.id,
                &output.ai_output,
                output.user_edited_output.as_ref(),
            )?;
        }
    }

    // 标签复制失败只告警
    match TagDao::list_by_project(conn, &source.id) {
        Ok(tags) => {
            for tag in tags {
                if let Err(e) = TagDao::add(conn, &copy.id, &tag.label) {
                    warn!("复制标签失败 ({}): {e}", tag.label);
                }
            }
        }
        Err(e) => warn!("读取源项目标签失败: {e}"),
    }

    record_activity(conn, &copy.id, "project.duplicated", Some(&source.id));
    Ok(copy)
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use toolthinker_core::database::schema::create_tables;
    use toolthinker_core::models::project_model::ProjectStatus;
    use toolthinker_core::models::step_model::StepStatus;

    fn setup_test_db() -> (Connection, Project) {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        for (id, email) in [("u1", "a@b.c"), ("u2", "x@y.z")] {
            conn.execute(
                "INSERT INTO users (id, email, password_hash, salt, created_at)
                 VALUES (?1, ?2, 'h', 's', 0)",
                rusqlite::params![id, email],
            )
            .unwrap();
        }
        let project = ProjectDao::create(
            &conn,
            "u1",
            &CreateProjectRequest {
                name: "Original".to_string(),
                description: Some("desc".to_string()),
                priority: Some(3),
            },
        )
        .unwrap();
        (conn, project)
    }

    #[test]
    fn test_duplicate_requires_ownership() {
        let (conn, project) = setup_test_db();
        let result = duplicate_project(&conn, "u2", &project.id, None);
        assert!(matches!(result, Err(ProjectError::Forbidden(_))));
    }

    #[test]
    fn test_duplicate_copies_metadata() {
        let (conn, project) = setup_test_db();
        ProjectDao::update(
            &conn,
            &project.id,
            &ProjectUpdate {
                status: Some(ProjectStatus::Active),
                ..Default::default()
            },
        )
        .unwrap();

        let copy = duplicate_project(&conn, "u1", &project.id, None).unwrap();
        assert_eq!(copy.name, "Original (Copy)");
        assert_eq!(copy.description.as_deref(), Some("desc"));
        assert_eq!(copy.priority, 3);
        assert_eq!(copy.status, ProjectStatus::Active);
        assert_ne!(copy.id, project.id);
    }

    #[test]
    fn test_duplicate_copies_steps_inputs_outputs() {
        let (conn, project) = setup_test_db();

        let step = StepDao::get_or_create(&conn, &project.id, "idea_refinement").unwrap();
        let mut data = HashMap::new();
        data.insert("idea".to_string(), json!("marketplace"));
        StepInputDao::replace(&conn, &step.id, &data).unwrap();
        // 输出打到 version 2，带用户编辑版
        StepOutputDao::upsert_ai_output(&conn, &step.id, &json!({"problem_statement": "v1"}))
            .unwrap();
        StepOutputDao::upsert_ai_output(&conn, &step.id, &json!({"problem_statement": "v2"}))
            .unwrap();
        StepOutputDao::set_user_edited(&conn, &step.id, &json!({"problem_statement": "edited"}))
            .unwrap();
        StepDao::mark_completed(&conn, &step.id).unwrap();

        let copy = duplicate_project(&conn, "u1", &project.id, None).unwrap();
        let copied_step = StepDao::get_by_key(&conn, &copy.id, "idea_refinement")
            .unwrap()
            .unwrap();

        // 状态与时间戳保留
        assert_eq!(copied_step.status, StepStatus::Completed);
        assert!(copied_step.completed_at.is_some());

        let copied_input = StepInputDao::get_by_step(&conn, &copied_step.id)
            .unwrap()
            .unwrap();
        assert_eq!(copied_input.data.get("idea"), Some(&json!("marketplace")));

        // 输出两版都带上，version 重置为 1
        let copied_output = StepOutputDao::get_by_step(&conn, &copied_step.id)
            .unwrap()
            .unwrap();
        assert_eq!(copied_output.version, 1);
        assert_eq!(copied_output.ai_output, json!({"problem_statement": "v2"}));
        assert_eq!(
            copied_output.user_edited_output,
            Some(json!({"problem_statement": "edited"}))
        );
    }

    #[test]
    fn test_duplicate_with_custom_name() {
        let (conn, project) = setup_test_db();
        let copy = duplicate_project(&conn, "u1", &project.id, Some("Pivot Draft")).unwrap();
        assert_eq!(copy.name, "Pivot Draft");
    }

    #[test]
    fn test_duplicate_blank_name_falls_back_to_suffix() {
        let (conn, project) = setup_test_db();
        let copy = duplicate_project(&conn, "u1", &project.id, Some("   ")).unwrap();
        assert_eq!(copy.name, "Original (Copy)");
    }

    #[test]
    fn test_duplicate_copies_tags() {
        let (conn, project) = setup_test_db();
        TagDao::add(&conn, &project.id, "saas").unwrap();
        TagDao::add(&conn, &project.id, "b2b").unwrap();

        let copy = duplicate_project(&conn, "u1", &project.id, None).unwrap();
        let labels: Vec<String> = TagDao::list_by_project(&conn, &copy.id)
            .unwrap()
            .into_iter()
            .map(|t| t.label)
            .collect();
        assert_eq!(labels.len(), 2);
        assert!(labels.contains(&"saas".to_string()));
    }

    #[test]
    fn test_duplicate_is_independent() {
        let (conn, project) = setup_test_db();
        let step = StepDao::get_or_create(&conn, &project.id, "idea_refinement").unwrap();
        StepOutputDao::upsert_ai_output(&conn, &step.id, &json!({"problem_statement": "x"}))
            .unwrap();

        let copy = duplicate_project(&conn, "u1", &project.id, None).unwrap();

        // 改原项目不影响副本
        StepOutputDao::upsert_ai_output(&conn, &step.id, &json!({"problem_statement": "changed"}))
            .unwrap();
        let copied_step = StepDao::get_by_key(&conn, &copy.id, "idea_refinement")
            .unwrap()
            .unwrap();
        let copied_output = StepOutputDao::get_by_step(&conn, &copied_step.id)
            .unwrap()
            .unwrap();
        assert_eq!(copied_output.ai_output, json!({"problem_statement": "x"}));
    }
}
