use std::sync::Arc;

use domain::{DeviceId, DeviceSession, SessionRepository};
use uuid::Uuid;

use crate::clock::Clock;
use crate::dto::DeviceView;
use crate::error::ApplicationError;
use crate::tokens::{RefreshClaims, TokenIssuer};

pub struct DevicesServiceDependencies {
    pub sessions: Arc<dyn SessionRepository>,
    pub token_issuer: Arc<dyn TokenIssuer>,
    pub clock: Arc<dyn Clock>,
}

/// 设备会话管理（/security/devices），鉴权凭据是刷新令牌 cookie。
pub struct DevicesService {
    deps: DevicesServiceDependencies,
}

impl DevicesService {
    pub fn new(deps: DevicesServiceDependencies) -> Self {
        Self { deps }
    }

    /// 列出用户的活跃设备会话，顺带清理已过期的记录。
    pub async fn list(&self, refresh_token: &str) -> Result<Vec<DeviceView>, ApplicationError> {
        let (_, session) = self.authorize(refresh_token).await?;
        self.deps.sessions.delete_expired(self.deps.clock.now()).await?;

        let sessions = self.deps.sessions.list_by_user(session.user_id).await?;
        Ok(sessions.iter().map(DeviceView::from).collect())
    }

    /// 注销除当前设备外的所有会话。
    pub async fn delete_others(&self, refresh_token: &str) -> Result<(), ApplicationError> {
        let (claims, session) = self.authorize(refresh_token).await?;
        self.deps
            .sessions
            .delete_others(session.user_id, DeviceId::from(claims.device_id))
            .await?;
        Ok(())
    }

    /// 注销指定设备。只有会话属主可以操作：
    /// 他人的设备 → Forbidden，不存在的设备 → NotFound。
    pub async fn delete_device(
        &self,
        refresh_token: &str,
        device_id: Uuid,
    ) -> Result<(), ApplicationError> {
        let (_, session) = self.authorize(refresh_token).await?;

        let target = self
            .deps
            .sessions
            .find_by_device(DeviceId::from(device_id))
            .await?
            .ok_or(ApplicationError::NotFound)?;
        if target.user_id != session.user_id {
            return Err(ApplicationError::Forbidden);
        }

        self.deps.sessions.delete(target.device_id).await?;
        Ok(())
    }

    /// 与 AuthService 相同的刷新令牌校验规则。
    async fn authorize(
        &self,
        refresh_token: &str,
    ) -> Result<(RefreshClaims, DeviceSession), ApplicationError> {
        let claims = self
            .deps
            .token_issuer
            .verify_refresh(refresh_token)
            .map_err(|_| ApplicationError::Authentication)?;

        let session = self
            .deps
            .sessions
            .find_by_device(DeviceId::from(claims.device_id))
            .await?
            .ok_or(ApplicationError::Authentication)?;

        if Uuid::from(session.user_id) != claims.user_id
            || !session.matches_issued_at(claims.issued_at)
        {
            return Err(ApplicationError::Authentication);
        }

        Ok((claims, session))
    }
}
