//! 认证服务
//!
//! 注册、登录、会话 token 校验与密码重置。
//!
//! ## 凭据策略
//! - 密码哈希 = SHA-256(salt || password) 的 hex，salt 每用户随机
//! - 会话 token 为 32 字节随机数的 hex，明文只在签发时返回一次，
//!   库中仅存 SHA-256 哈希
//! - 密码重置永远返回成功，不暴露邮箱是否注册

use rand::RngCore;
use rusqlite::Connection;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use toolthinker_core::database::dao::user_dao::{SessionDao, UserDao};
use toolthinker_core::errors::domain_error::AuthError;
use toolthinker_core::models::user_model::{LoginRequest, RegisterRequest, User};

use crate::mailer::Mailer;

/// 会话有效期：30 天
pub const SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

const MIN_PASSWORD_LEN: usize = 8;

/// 签发结果：明文 token 只在这里出现一次
#[derive(Debug, Clone, Serialize)]
pub struct AuthToken {
    pub token: String,
    pub expires_at: i64,
    pub user: User,
}

fn sha256_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

fn hash_password(salt_hex: &str, password: &str) -> String {
    sha256_hex(format!("{salt_hex}{password}").as_bytes())
}

fn hash_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::Validation("邮箱格式无效".to_string()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "密码长度至少 {MIN_PASSWORD_LEN} 位"
        )));
    }
    Ok(())
}

fn issue_session(conn: &Connection, user: User) -> Result<AuthToken, AuthError> {
    let token = random_hex(32);
    let expires_at = chrono::Utc::now().timestamp() + SESSION_TTL_SECS;
    SessionDao::create(conn, &user.id, &hash_token(&token), expires_at)?;
    Ok(AuthToken {
        token,
        expires_at,
        user,
    })
}

/// 注册并自动登录
pub fn register(conn: &Connection, req: &RegisterRequest) -> Result<AuthToken, AuthError> {
    validate_credentials(&req.email, &req.password)?;
    let email = req.email.trim().to_ascii_lowercase();

    let salt = random_hex(16);
    let password_hash = hash_password(&salt, &req.password);
    let user = UserDao::create(conn, &email, &password_hash, &salt)?;

    info!("用户注册: {}", user.id);
    issue_session(conn, user)
}

/// 登录
///
/// 邮箱不存在和密码错误返回同一个错误，不暴露账户是否存在。
pub fn login(conn: &Connection, req: &LoginRequest) -> Result<AuthToken, AuthError> {
    let email = req.email.trim().to_ascii_lowercase();
    let user = UserDao::get_by_email(conn, &email)?.ok_or(AuthError::InvalidCredentials)?;

    if hash_password(&user.salt, &req.password) != user.password_hash {
        return Err(AuthError::InvalidCredentials);
    }
    issue_session(conn, user)
}

/// 校验 bearer token，返回对应用户
///
/// 过期会话顺手删除。
pub fn verify_token(conn: &Connection, token: &str) -> Result<User, AuthError> {
    let token_hash = hash_token(token);
    let session =
        SessionDao::get_by_token_hash(conn, &token_hash)?.ok_or(AuthError::Unauthorized)?;

    if session.is_expired(chrono::Utc::now().timestamp()) {
        SessionDao::delete_by_token_hash(conn, &token_hash)?;
        return Err(AuthError::Unauthorized);
    }

    UserDao::get(conn, &session.user_id)?.ok_or(AuthError::Unauthorized)
}

/// 登出：注销当前会话
pub fn logout(conn: &Connection, token: &str) -> Result<(), AuthError> {
    SessionDao::delete_by_token_hash(conn, &hash_token(token))
}

/// 请求密码重置
///
/// 无论邮箱是否注册都返回成功；发信失败只告警。
pub fn request_password_reset<'a>(
    conn: &Connection,
    mailer: &'a dyn Mailer,
    email: &str,
) -> impl std::future::Future<Output = Result<(), AuthError>> + Send + 'a {
    // `&Connection` 不是 `Send`，同步阶段先完成，返回的 future 才能满足
    // axum handler 的 `Send` 约束。
    let prepared: Result<Option<(String, String)>, AuthError> = (|| {
        let email = email.trim().to_ascii_lowercase();
        let Some(user) = UserDao::get_by_email(conn, &email)? else {
            info!("密码重置请求命中未注册邮箱，静默返回");
            return Ok(None);
        };

        let reset_code = random_hex(16);
        let body = format!(
            "We received a request to reset your Tool Thinker password.\n\
             Your reset code is: {reset_code}\n\
             If you did not request this, you can ignore this email."
        );
        Ok(Some((user.email, body)))
    })();

    async move {
        if let Some((to, body)) = prepared? {
            if let Err(e) = mailer
                .send(&to, "Reset your Tool Thinker password", &body)
                .await
            {
                warn!("密码重置邮件发送失败: {e}");
            }
        }
        Ok(())
    }
}

// ============================================================================
// 测试
// ============================================================================
