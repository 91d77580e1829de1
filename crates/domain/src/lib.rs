//! 博客平台核心领域模型
//!
//! 包含用户、博客、帖子、评论、点赞、设备会话等核心实体，
//! 以及仓储接口和分页约定。

pub mod attempt;
pub mod blog;
pub mod comment;
pub mod errors;
pub mod like;
pub mod post;
pub mod repository;
pub mod session;
pub mod user;
pub mod value_objects;

pub use attempt::*;
pub use blog::*;
pub use comment::*;
pub use errors::*;
pub use like::*;
pub use post::*;
pub use repository::*;
pub use session::*;
pub use user::*;
pub use value_objects::*;
