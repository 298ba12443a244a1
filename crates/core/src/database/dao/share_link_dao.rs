//! 分享链接数据访问层
//!
//! 库中仅存 token 的 SHA-256 哈希，明文 token 只在签发时返回一次。
//! 匿名读取时按哈希查找并校验过期时间。

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::errors::domain_error::ProjectError;
use crate::models::project_model::ShareLink;

/// 分享链接 DAO
pub struct ShareLinkDao;

impl ShareLinkDao {
    /// 签发分享链接记录
    pub fn create(
        conn: &Connection,
        project_id: &str,
        token_hash: &str,
        expires_at: i64,
    ) -> Result<ShareLink, ProjectError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO share_links (id, project_id, token_hash, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, project_id, token_hash, now, expires_at],
        )?;
        Ok(ShareLink {
            id,
            project_id: project_id.to_string(),
            token_hash: token_hash.to_string(),
            created_at: now,
            expires_at,
        })
    }

    /// 按 token 哈希查找
    pub fn get_by_token_hash(
        conn: &Connection,
        token_hash: &str,
    ) -> Result<Option<ShareLink>, ProjectError> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, token_hash, created_at, expires_at
             FROM share_links WHERE token_hash = ?",
        )?;
        let mut rows = stmt.query([token_hash])?;

        if let Some(row) = rows.next()? {
            Ok(Some(ShareLink {
                id: row.get(0)?,
                project_id: row.get(1)?,
                token_hash: row.get(2)?,
                created_at: row.get(3)?,
                expires_at: row.get(4)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// 撤销项目下的全部分享链接
    pub fn revoke_by_project(conn: &Connection, project_id: &str) -> Result<usize, ProjectError> {
        let rows = conn.execute("DELETE FROM share_links WHERE project_id = ?", [project_id])?;
        Ok(rows)
    }

    /// 清理过期链接
    pub fn purge_expired(conn: &Connection, now: i64) -> Result<usize, ProjectError> {
        let rows = conn.execute("DELETE FROM share_links WHERE expires_at <= ?", [now])?;
        Ok(rows)
    }
}
