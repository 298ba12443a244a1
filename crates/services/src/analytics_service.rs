//! 项目组合统计服务
//!
//! 汇总用户的项目总量、状态分布与整体进度。逐项目的健康度
//! 明细只算列表中的前 10 个项目，避免大账户下的全表扫描。

use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;

use toolthinker_core::database::dao::project_dao::ProjectDao;
use toolthinker_core::database::dao::step_dao::StepDao;
use toolthinker_core::errors::domain_error::ProjectError;
use toolthinker_core::frameworks;
use toolthinker_core::models::project_model::ProjectStatus;
use toolthinker_core::models::step_model::StepStatus;

/// 健康度明细最多覆盖的项目数
pub const HEALTH_DETAIL_LIMIT: usize = 10;

/// 单项目健康度
#[derive(Debug, Clone, Serialize)]
pub struct ProjectHealth {
    pub project_id: String,
    pub name: String,
    pub status: ProjectStatus,
    pub completed_steps: usize,
    pub total_steps: usize,
    pub completion_rate: f64,
}

/// 组合统计
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub total_projects: usize,
    /// 状态 -> 项目数
    pub status_distribution: BTreeMap<String, usize>,
    /// 健康度明细（最多前 10 个项目，按更新时间倒序）
    pub health: Vec<ProjectHealth>,
    /// 明细覆盖项目的平均完成率
    pub average_completion_rate: f64,
}

/// 汇总用户的项目组合
pub fn portfolio_summary(conn: &Connection, user_id: &str) -> Result<PortfolioSummary, ProjectError> {
    let projects = ProjectDao::list_by_user(conn, user_id)?;
    let total_steps = frameworks::step_count();

    let mut status_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for project in &projects {
        *status_distribution
            .entry(project.status.as_str().to_string())
            .or_insert(0) += 1;
    }

    let mut health = Vec::new();
    for project in projects.iter().take(HEALTH_DETAIL_LIMIT) {
        let steps = StepDao::list_by_project(conn, &project.id)?;
        let completed = steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count();
        health.push(ProjectHealth {
            project_id: project.id.clone(),
            name: project.name.clone(),
            status: project.status,
            completed_steps: completed,
            total_steps,
            completion_rate: completed as f64 / total_steps as f64,
        });
    }

    let average_completion_rate = if health.is_empty() {
        0.0
    } else {
        health.iter().map(|h| h.completion_rate).sum::<f64>() / health.len() as f64
    };

    Ok(PortfolioSummary {
        total_projects: projects.len(),
        status_distribution,
        health,
        average_completion_rate,
    })
}

// ============================================================================
// 测试
// ============================================================================
