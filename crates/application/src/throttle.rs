//! 连接限流
//!
//! 敏感端点（登录、注册、找回密码等）的固定窗口计数器：
//! 统计同一 (IP, 路径) 在滑尾窗口内的既往尝试次数，达到上限即拒绝，
//! 否则记录本次尝试后放行。不是令牌桶，没有平滑和部分回填。

use std::sync::Arc;

use chrono::Duration;
use domain::{AttemptRepository, ConnectionAttempt};

use crate::clock::Clock;
use crate::error::ApplicationError;

pub struct ThrottleService {
    attempts: Arc<dyn AttemptRepository>,
    clock: Arc<dyn Clock>,
    window: Duration,
    max_attempts: u32,
}

impl ThrottleService {
    pub fn new(
        attempts: Arc<dyn AttemptRepository>,
        clock: Arc<dyn Clock>,
        window_seconds: i64,
        max_attempts: u32,
    ) -> Self {
        Self {
            attempts,
            clock,
            window: Duration::seconds(window_seconds),
            max_attempts,
        }
    }

    /// 检查并记录一次连接尝试。达到上限返回 `RateLimited`。
    pub async fn check_and_record(
        &self,
        ip: impl Into<String>,
        route: impl Into<String>,
    ) -> Result<(), ApplicationError> {
        let ip = ip.into();
        let route = route.into();
        let now = self.clock.now();
        let since = now - self.window;

        // 窗口外的记录不再参与判定，顺手删掉以免表无限增长
        self.attempts.delete_older_than(since).await?;

        let prior = self
            .attempts
            .count_since(ip.clone(), route.clone(), since)
            .await?;
        if prior >= self.max_attempts as u64 {
            tracing::debug!(%ip, %route, prior, "connection attempt throttled");
            return Err(ApplicationError::RateLimited);
        }

        self.attempts
            .record(ConnectionAttempt::new(ip, route, now))
            .await?;
        Ok(())
    }
}
