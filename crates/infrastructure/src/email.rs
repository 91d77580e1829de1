//! 邮件发送实现
//!
//! 投递服务商不在系统边界内，这里把邮件内容写进日志。
//! 端到端测试从日志（或测试桩）取确认码。

use application::{EmailError, EmailSender};
use async_trait::async_trait;
use domain::UserEmail;
use uuid::Uuid;

#[derive(Default)]
pub struct TracingEmailSender;

#[async_trait]
impl EmailSender for TracingEmailSender {
    async fn send_confirmation(&self, to: &UserEmail, code: Uuid) -> Result<(), EmailError> {
        tracing::info!(to = %to, %code, "sending registration confirmation email");
        Ok(())
    }

    async fn send_recovery(&self, to: &UserEmail, code: Uuid) -> Result<(), EmailError> {
        tracing::info!(to = %to, %code, "sending password recovery email");
        Ok(())
    }
}
