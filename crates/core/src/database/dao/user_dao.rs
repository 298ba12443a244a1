//! 用户与会话数据访问层
//!
//! 会话 bearer token 明文不落库，仅存 SHA-256 哈希；
//! 哈希计算在 services 层的认证服务完成。

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::errors::domain_error::AuthError;
use crate::models::user_model::{Session, User};

/// 用户 DAO
pub struct UserDao;

impl UserDao {
    /// 创建用户；邮箱重复时返回 EmailAlreadyRegistered
    pub fn create(
        conn: &Connection,
        email: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<User, AuthError> {
        if Self::get_by_email(conn, email)?.is_some() {
            return Err(AuthError::EmailAlreadyRegistered(email.to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO users (id, email, password_hash, salt, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, email, password_hash, salt, now],
        )?;
        Ok(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            salt: salt.to_string(),
            created_at: now,
        })
    }

    /// 按邮箱查找
    pub fn get_by_email(conn: &Connection, email: &str) -> Result<Option<User>, AuthError> {
        let user = conn
            .query_row(
                "SELECT id, email, password_hash, salt, created_at
                 FROM users WHERE email = ?",
                [email],
                Self::map_row,
            )
            .optional()?;
        Ok(user)
    }

    /// 按 ID 查找
    pub fn get(conn: &Connection, id: &str) -> Result<Option<User>, AuthError> {
        let user = conn
            .query_row(
                "SELECT id, email, password_hash, salt, created_at
                 FROM users WHERE id = ?",
                [id],
                Self::map_row,
            )
            .optional()?;
        Ok(user)
    }

    fn map_row(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            salt: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

// ============================================================================
// 会话
// ============================================================================

/// 会话 DAO
pub struct SessionDao;

impl SessionDao {
    /// 创建会话记录
    pub fn create(
        conn: &Connection,
        user_id: &str,
        token_hash: &str,
        expires_at: i64,
    ) -> Result<Session, AuthError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO sessions (id, user_id, token_hash, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, user_id, token_hash, now, expires_at],
        )?;
        Ok(Session {
            id,
            user_id: user_id.to_string(),
            token_hash: token_hash.to_string(),
            created_at: now,
            expires_at,
        })
    }

    /// 按 token 哈希查找
    pub fn get_by_token_hash(
        conn: &Connection,
        token_hash: &str,
    ) -> Result<Option<Session>, AuthError> {
        let session = conn
            .query_row(
                "SELECT id, user_id, token_hash, created_at, expires_at
                 FROM sessions WHERE token_hash = ?",
                [token_hash],
                |row| {
                    Ok(Session {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        token_hash: row.get(2)?,
                        created_at: row.get(3)?,
                        expires_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    /// 注销会话（登出）
    pub fn delete_by_token_hash(conn: &Connection, token_hash: &str) -> Result<(), AuthError> {
        conn.execute("DELETE FROM sessions WHERE token_hash = ?", [token_hash])?;
        Ok(())
    }

    /// 清理过期会话
    pub fn purge_expired(conn: &Connection, now: i64) -> Result<usize, AuthError> {
        let rows = conn.execute("DELETE FROM sessions WHERE expires_at <= ?", [now])?;
        Ok(rows)
    }
}
