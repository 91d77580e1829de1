//! 令牌签发与验证抽象
//!
//! 访问令牌只携带 userId；刷新令牌携带 userId + deviceId + iat，
//! iat 同时写入设备会话作为旋转标记。infrastructure 提供 JWT 实现。

use chrono::{DateTime, Utc};
use domain::{DeviceId, Timestamp, UserId};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to issue token: {0}")]
    Issue(String),
    #[error("invalid token")]
    Invalid,
}

/// 已验证的访问令牌声明。
#[derive(Debug, Clone, Copy)]
pub struct AccessClaims {
    pub user_id: Uuid,
}

/// 已验证的刷新令牌声明。
#[derive(Debug, Clone, Copy)]
pub struct RefreshClaims {
    pub user_id: Uuid,
    pub device_id: Uuid,
    /// 签发时间，与会话的 `last_active_at` 比对
    pub issued_at: DateTime<Utc>,
}

/// 一次签发的令牌对。
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// 刷新令牌签发时间（秒级精度）
    pub refresh_issued_at: Timestamp,
    /// 刷新令牌过期时间
    pub refresh_expires_at: Timestamp,
}

pub trait TokenIssuer: Send + Sync {
    fn issue_pair(
        &self,
        user_id: UserId,
        device_id: DeviceId,
        now: Timestamp,
    ) -> Result<TokenPair, TokenError>;

    fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError>;

    fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError>;
}
