//! 项目对比服务
//!
//! 并排对比 2 到 5 个项目：项目元信息、完成率、
//! 按框架固定顺序的步骤快照。

use rusqlite::Connection;
use serde::Serialize;

use toolthinker_core::database::dao::project_dao::ProjectDao;
use toolthinker_core::database::dao::step_dao::StepDao;
use toolthinker_core::database::dao::step_input_dao::StepInputDao;
use toolthinker_core::database::dao::step_output_dao::StepOutputDao;
use toolthinker_core::errors::domain_error::CompareError;
use toolthinker_core::frameworks;
use toolthinker_core::models::project_model::ProjectStatus;
use toolthinker_core::models::step_model::{StepSnapshot, StepStatus};
use toolthinker_core::models::Owned;

/// 对比项目数量范围
pub const MIN_PROJECTS: usize = 2;
pub const MAX_PROJECTS: usize = 5;

/// 单个项目的对比视图
#[derive(Debug, Clone, Serialize)]
pub struct ProjectComparison {
    pub project_id: String,
    pub name: String,
    pub status: ProjectStatus,
    /// 已完成步骤数 / 工作流总步骤数
    pub completion_rate: f64,
    pub completed_steps: usize,
    pub total_steps: usize,
    /// 按框架固定顺序的步骤快照
    pub steps: Vec<StepSnapshot>,
}

/// 对比报告
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub projects: Vec<ProjectComparison>,
}

fn snapshot_project(
    conn: &Connection,
    project_id: &str,
) -> Result<(Vec<StepSnapshot>, usize), CompareError> {
    let mut snapshots = Vec::new();
    let mut completed = 0;

    for key in frameworks::step_keys() {
        let Some(step) = StepDao::get_by_key(conn, project_id, key)? else {
            snapshots.push(StepSnapshot {
                step_key: key.to_string(),
                status: StepStatus::NotStarted,
                input: None,
                output: None,
            });
            continue;
        };
        if step.status == StepStatus::Completed {
            completed += 1;
        }
        let input = StepInputDao::get_by_step(conn, &step.id)?.map(|i| i.data);
        let output = StepOutputDao::get_by_step(conn, &step.id)?.map(|o| o.effective().clone());
        snapshots.push(StepSnapshot {
            step_key: key.to_string(),
            status: step.status,
            input,
            output,
        });
    }
    Ok((snapshots, completed))
}

/// 对比多个项目
///
/// 全部项目必须存在且属于调用者；任何一个不满足则整体失败。
pub fn compare_projects(
    conn: &Connection,
    user_id: &str,
    project_ids: &[String],
) -> Result<ComparisonReport, CompareError> {
    if project_ids.len() < MIN_PROJECTS || project_ids.len() > MAX_PROJECTS {
        return Err(CompareError::InvalidProjectCount(project_ids.len()));
    }

    let total = frameworks::step_count();
    let mut projects = Vec::with_capacity(project_ids.len());

    for id in project_ids {
        let project = ProjectDao::get(conn, id)
            .map_err(|e| match e {
                toolthinker_core::errors::domain_error::ProjectError::DatabaseError(e) => {
                    CompareError::DatabaseError(e)
                }
                other => CompareError::ProjectNotFound(other.to_string()),
            })?
            .ok_or_else(|| CompareError::ProjectNotFound(id.clone()))?;
        if project.owner_id() != user_id {
            return Err(CompareError::Forbidden(id.clone()));
        }

        let (steps, completed) = snapshot_project(conn, id)?;
        projects.push(ProjectComparison {
            project_id: project.id.clone(),
            name: project.name.clone(),
            status: project.status,
            completion_rate: completed as f64 / total as f64,
            completed_steps: completed,
            total_steps: total,
            steps,
        });
    }

    Ok(ComparisonReport { projects })
}

// ============================================================================
// 测试
// ============================================================================
