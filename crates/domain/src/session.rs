//! 设备会话
//!
//! 一条会话记录绑定 (设备, 用户) 与刷新令牌的签发时间（旋转标记）。
//! 刷新令牌仅在会话记录的 `last_active_at` 与令牌 iat 一致时有效：
//! 旋转会更新 `last_active_at`，旧令牌随之失效，天然防重放。

use serde::{Deserialize, Serialize};

use crate::value_objects::{DeviceId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSession {
    pub device_id: DeviceId,
    pub user_id: UserId,
    pub ip: String,
    /// 设备名称（通常取自 User-Agent）
    pub device_name: String,
    /// 旋转标记：当前有效刷新令牌的签发时间
    pub last_active_at: Timestamp,
    pub expires_at: Timestamp,
}

impl DeviceSession {
    /// 登录时开启新会话。
    pub fn start(
        device_id: DeviceId,
        user_id: UserId,
        ip: impl Into<String>,
        device_name: impl Into<String>,
        issued_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            device_id,
            user_id,
            ip: ip.into(),
            device_name: device_name.into(),
            last_active_at: issued_at,
            expires_at,
        }
    }

    /// 刷新令牌时旋转会话：旧令牌的 iat 不再匹配，立即失效。
    pub fn rotate(&mut self, ip: impl Into<String>, issued_at: Timestamp, expires_at: Timestamp) {
        self.ip = ip.into();
        self.last_active_at = issued_at;
        self.expires_at = expires_at;
    }

    /// 判断携带给定 iat 的刷新令牌是否与当前会话匹配。
    pub fn matches_issued_at(&self, issued_at: Timestamp) -> bool {
        self.last_active_at.timestamp() == issued_at.timestamp()
    }
}
