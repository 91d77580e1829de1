//! 应用服务
//!
//! 每个聚合一个服务，构造函数注入依赖，进程启动时装配一次。

pub mod auth_service;
pub mod blogs_service;
pub mod comments_service;
pub mod devices_service;
pub mod posts_service;
pub mod testing_service;
pub mod users_service;

pub use auth_service::{
    AuthService, AuthServiceDependencies, LoginRequest, NewPasswordRequest, RegisterRequest,
};
pub use blogs_service::{BlogInput, BlogsService, BlogsServiceDependencies};
pub use comments_service::{CommentsService, CommentsServiceDependencies, CreateCommentRequest};
pub use devices_service::{DevicesService, DevicesServiceDependencies};
pub use posts_service::{PostInput, PostsService, PostsServiceDependencies};
pub use testing_service::{TestingService, TestingServiceDependencies};
pub use users_service::{CreateUserRequest, UsersService, UsersServiceDependencies};

use crate::error::ApplicationError;

/// 明文密码的边界校验（6..=20 字符）。
pub(crate) fn validate_password(field: &str, value: &str) -> Result<(), ApplicationError> {
    if value.len() < 6 {
        return Err(ApplicationError::field_error(field, "too short"));
    }
    if value.len() > 20 {
        return Err(ApplicationError::field_error(field, "too long"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod blogs_service_tests;
#[cfg(test)]
mod devices_service_tests;
