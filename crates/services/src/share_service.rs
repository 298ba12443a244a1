//! 分享链接服务
//!
//! 为项目签发带过期时间的只读分享链接。token 明文只在签发时
//! 返回一次，匿名读取按哈希查找并校验过期；失效链接一律按
//! 不存在处理，不区分"过期"与"从未存在"。

use rand::RngCore;
use rusqlite::Connection;
use serde::Serialize;
use sha2::{Digest, Sha256};

use toolthinker_core::database::dao::project_dao::ProjectDao;
use toolthinker_core::database::dao::share_link_dao::ShareLinkDao;
use toolthinker_core::database::dao::step_dao::StepDao;
use toolthinker_core::database::dao::step_output_dao::StepOutputDao;
use toolthinker_core::errors::domain_error::ProjectError;
use toolthinker_core::frameworks;
use toolthinker_core::models::project_model::ProjectStatus;

use crate::project_service::load_owned_project;

/// 默认分享有效期：7 天
pub const DEFAULT_SHARE_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// 签发结果
#[derive(Debug, Clone, Serialize)]
pub struct IssuedShareLink {
    pub token: String,
    pub expires_at: i64,
}

/// 分享视图里的一个小节
#[derive(Debug, Clone, Serialize)]
pub struct SharedSection {
    pub step_key: String,
    pub title: &'static str,
    pub output: serde_json::Value,
}

/// 匿名可见的项目只读视图
///
/// 只暴露名称、描述、状态和有效输出，不含笔记、标签等私有数据。
#[derive(Debug, Clone, Serialize)]
pub struct SharedProjectView {
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub sections: Vec<SharedSection>,
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// 签发分享链接
pub fn create_share_link(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
    ttl_secs: Option<i64>,
) -> Result<IssuedShareLink, ProjectError> {
    load_owned_project(conn, project_id, user_id)?;

    let ttl = ttl_secs.unwrap_or(DEFAULT_SHARE_TTL_SECS);
    if ttl <= 0 {
        return Err(ProjectError::Validation("有效期必须为正".to_string()));
    }

    let mut buf = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut buf);
    let token = hex::encode(buf);
    let expires_at = chrono::Utc::now().timestamp() + ttl;

    ShareLinkDao::create(conn, project_id, &sha256_hex(&token), expires_at)?;
    Ok(IssuedShareLink { token, expires_at })
}

/// 撤销项目的全部分享链接
pub fn revoke_share_links(
    conn: &Connection,
    user_id: &str,
    project_id: &str,
) -> Result<usize, ProjectError> {
    load_owned_project(conn, project_id, user_id)?;
    ShareLinkDao::revoke_by_project(conn, project_id)
}

/// 按 token 解析分享视图（匿名访问）
pub fn resolve_share_link(
    conn: &Connection,
    token: &str,
) -> Result<SharedProjectView, ProjectError> {
    let link = ShareLinkDao::get_by_token_hash(conn, &sha256_hex(token))?
        .ok_or_else(|| ProjectError::NotFound("分享链接".to_string()))?;

    if link.is_expired(chrono::Utc::now().timestamp()) {
        return Err(ProjectError::NotFound("分享链接".to_string()));
    }

    let project = ProjectDao::get(conn, &link.project_id)?
        .ok_or_else(|| ProjectError::NotFound("分享链接".to_string()))?;

    let mut sections = Vec::new();
    for def in frameworks::all() {
        let Some(step) = StepDao::get_by_key(conn, &project.id, def.key)? else {
            continue;
        };
        if let Some(output) = StepOutputDao::get_by_step(conn, &step.id)? {
            sections.push(SharedSection {
                step_key: def.key.to_string(),
                title: def.title,
                output: output.effective().clone(),
            });
        }
    }

    Ok(SharedProjectView {
        project_name: project.name,
        description: project.description,
        status: project.status,
        sections,
    })
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use toolthinker_core::database::schema::create_tables;
    use toolthinker_core::models::project_model::CreateProjectRequest;

    fn setup_test_db() -> (Connection, String) {
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
                name: "Shared".to_string(),
                description: None,
                priority: None,
            },
        )
        .unwrap();
        (conn, project.id)
    }

    #[test]
    fn test_only_owner_can_share() {
        let (conn, project_id) = setup_test_db();
        let result = create_share_link(&conn, "u2", &project_id, None);
        assert!(matches!(result, Err(ProjectError::Forbidden(_))));
    }

    #[test]
    fn test_issue_and_resolve() {
        let (conn, project_id) = setup_test_db();
        let step = StepDao::get_or_create(&conn, &project_id, "idea_refinement").unwrap();
        StepOutputDao::upsert_ai_output(&conn, &step.id, &json!({"problem_statement": "p"}))
            .unwrap();

        let issued = create_share_link(&conn, "u1", &project_id, None).unwrap();
        let view = resolve_share_link(&conn, &issued.token).unwrap();

        assert_eq!(view.project_name, "Shared");
        assert_eq!(view.sections.len(), 1);
        assert_eq!(view.sections[0].step_key, "idea_refinement");
    }

    #[test]
    fn test_unknown_token_is_not_found() {
        let (conn, _) = setup_test_db();
        let result = resolve_share_link(&conn, "deadbeef");
        assert!(matches!(result, Err(ProjectError::NotFound(_))));
    }

    #[test]
    fn test_expired_link_behaves_like_missing() {
        let (conn, project_id) = setup_test_db();
        let issued = create_share_link(&conn, "u1", &project_id, None).unwrap();

        conn.execute("UPDATE share_links SET expires_at = 1", []).unwrap();
        let result = resolve_share_link(&conn, &issued.token);
        assert!(matches!(result, Err(ProjectError::NotFound(_))));
    }

    #[test]
    fn test_revoke_invalidates_all_links() {
        let (conn, project_id) = setup_test_db();
        let a = create_share_link(&conn, "u1", &project_id, None).unwrap();
        let b = create_share_link(&conn, "u1", &project_id, None).unwrap();

        let revoked = revoke_share_links(&conn, "u1", &project_id).unwrap();
        assert_eq!(revoked, 2);
        assert!(resolve_share_link(&conn, &a.token).is_err());
        assert!(resolve_share_link(&conn, &b.token).is_err());
    }

    #[test]
    fn test_nonpositive_ttl_rejected() {
        let (conn, project_id) = setup_test_db();
        let result = create_share_link(&conn, "u1", &project_id, Some(0));
        assert!(matches!(result, Err(ProjectError::Validation(_))));
    }
}
