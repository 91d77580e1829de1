//! 基础设施层
//!
//! 仓储接口的 Postgres 实现，以及密码哈希、JWT 签发、邮件发送等
//! 应用层抽象的具体落地。

pub mod db;
pub mod email;
pub mod password;
pub mod tokens;

pub use db::{create_pg_pool, DbPool};
pub use email::TracingEmailSender;
pub use password::BcryptPasswordHasher;
pub use tokens::JwtTokenIssuer;
