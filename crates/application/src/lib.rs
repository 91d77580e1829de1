//! 应用层
//!
//! 将仓储调用编排为单一用例，并把领域实体整形为输出 DTO。
//! 服务通过显式的依赖结构体（`…Dependencies`）在进程启动时装配一次。

pub mod clock;
pub mod dto;
pub mod email;
pub mod error;
pub mod password;
pub mod services;
pub mod throttle;
pub mod tokens;

pub use clock::{Clock, SystemClock};
pub use dto::*;
pub use email::{EmailError, EmailSender};
pub use error::{ApplicationError, FieldError};
pub use password::{PasswordHasher, PasswordHasherError};
pub use throttle::ThrottleService;
pub use tokens::{AccessClaims, RefreshClaims, TokenError, TokenIssuer, TokenPair};
