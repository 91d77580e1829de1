use async_trait::async_trait;
use domain::UserEmail;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("failed to send email: {0}")]
    Send(String),
}

/// 邮件发送抽象。投递服务商在系统边界之外，
/// infrastructure 提供记录日志的实现。
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// 发送注册确认邮件，正文包含确认码。
    async fn send_confirmation(&self, to: &UserEmail, code: Uuid) -> Result<(), EmailError>;

    /// 发送密码找回邮件，正文包含恢复码。
    async fn send_recovery(&self, to: &UserEmail, code: Uuid) -> Result<(), EmailError>;
}
