use domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::email::EmailError;
use crate::password::PasswordHasherError;
use crate::tokens::TokenError;

/// 字段级校验错误，API 层聚合为 `errorsMessages` 列表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub message: String,
    pub field: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("repository error: {0:?}")]
    Repository(RepositoryError),
    #[error("password error: {0}")]
    Password(#[from] PasswordHasherError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
    #[error("email error: {0}")]
    Email(#[from] EmailError),
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("authentication failed")]
    Authentication,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("rate limit exceeded")]
    RateLimited,
}

impl ApplicationError {
    /// 单字段校验错误的便利构造。
    pub fn field_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApplicationError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Repository(value)
    }
}
