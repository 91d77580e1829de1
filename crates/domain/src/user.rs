//! 用户实体
//!
//! 注册时生成邮箱确认码，确认后才能登录；找回密码通过恢复码完成。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::{Login, PasswordHash, Timestamp, UserEmail, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: Login,
    pub email: UserEmail,
    #[serde(skip_serializing)] // 密码字段不暴露给客户端
    pub password: PasswordHash,
    pub created_at: Timestamp,
    /// 邮箱确认码，确认完成后清空
    pub confirmation_code: Option<Uuid>,
    /// 确认码过期时间
    pub confirmation_expires_at: Option<Timestamp>,
    pub is_confirmed: bool,
    /// 密码恢复码，使用后清空
    pub recovery_code: Option<Uuid>,
}

impl User {
    /// 自助注册：生成确认码，等待邮箱确认。
    pub fn register(
        id: UserId,
        login: Login,
        email: UserEmail,
        password: PasswordHash,
        confirmation_code: Uuid,
        confirmation_expires_at: Timestamp,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            login,
            email,
            password,
            created_at: now,
            confirmation_code: Some(confirmation_code),
            confirmation_expires_at: Some(confirmation_expires_at),
            is_confirmed: false,
            recovery_code: None,
        }
    }

    /// 管理员创建：无需邮箱确认流程。
    pub fn create_confirmed(
        id: UserId,
        login: Login,
        email: UserEmail,
        password: PasswordHash,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            login,
            email,
            password,
            created_at: now,
            confirmation_code: None,
            confirmation_expires_at: None,
            is_confirmed: true,
            recovery_code: None,
        }
    }

    /// 校验确认码是否对当前时刻有效。
    pub fn can_confirm_with(&self, code: Uuid, now: Timestamp) -> bool {
        if self.is_confirmed {
            return false;
        }
        match (self.confirmation_code, self.confirmation_expires_at) {
            (Some(expected), Some(expires_at)) => expected == code && now < expires_at,
            _ => false,
        }
    }

    pub fn confirm(&mut self) {
        self.is_confirmed = true;
        self.confirmation_code = None;
        self.confirmation_expires_at = None;
    }

    /// 重发确认邮件时刷新确认码。
    pub fn renew_confirmation_code(&mut self, code: Uuid, expires_at: Timestamp) {
        self.confirmation_code = Some(code);
        self.confirmation_expires_at = Some(expires_at);
    }

    pub fn set_recovery_code(&mut self, code: Uuid) {
        self.recovery_code = Some(code);
    }

    /// 恢复码验证通过后更新密码并作废恢复码。
    pub fn set_password(&mut self, password: PasswordHash) {
        self.password = password;
        self.recovery_code = None;
    }
}
