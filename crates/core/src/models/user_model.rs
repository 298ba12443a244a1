//! 用户与会话数据模型
//!
//! 定义用户、会话 token、密码重置请求的数据结构。
//! token 与密码的哈希策略见 `services` 层的认证服务。

use serde::{Deserialize, Serialize};

// ============================================================================
// 用户
// ============================================================================

/// 用户
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    /// 密码哈希（SHA-256(salt + password) 的 hex），不序列化到响应
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// 盐值 hex，不序列化到响应
    #[serde(skip_serializing)]
    pub salt: String,
    pub created_at: i64,
}

/// 注册请求
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// 登录请求
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 密码重置请求
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

// ============================================================================
// 会话
// ============================================================================

/// 会话
///
/// bearer token 明文只在签发时返回一次，库中仅存 SHA-256 哈希。
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl Session {
    /// 是否已过期
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}
