//! 连接尝试记录，用于敏感端点的固定窗口限流。

use serde::{Deserialize, Serialize};

use crate::value_objects::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionAttempt {
    pub ip: String,
    /// 请求路径，同一 IP 对不同路径分别计数
    pub route: String,
    pub attempted_at: Timestamp,
}

impl ConnectionAttempt {
    pub fn new(ip: impl Into<String>, route: impl Into<String>, attempted_at: Timestamp) -> Self {
        Self {
            ip: ip.into(),
            route: route.into(),
            attempted_at,
        }
    }
}
