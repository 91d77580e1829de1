//! 领域错误定义

use thiserror::Error;

/// 领域模型错误类型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("{resource} already exists: {field}")]
    AlreadyExists {
        resource: &'static str,
        field: String,
    },

    #[error("permission denied: {action}")]
    PermissionDenied { action: String },
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn already_exists(resource: &'static str, field: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource,
            field: field.into(),
        }
    }

    pub fn permission_denied(action: impl Into<String>) -> Self {
        Self::PermissionDenied {
            action: action.into(),
        }
    }
}

/// 仓储层错误类型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("resource not found")]
    NotFound,

    #[error("resource conflict")]
    Conflict,

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
