//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给应用层的用例服务。
//! 鉴权分三种：访问令牌（Bearer）、刷新令牌（httpOnly cookie）、
//! 管理员 Basic Auth。

mod auth;
mod error;
mod pagination;
mod routes;
mod state;
mod validation;

pub use routes::router;
pub use state::AppState;
