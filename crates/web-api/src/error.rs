//! API 错误整形
//!
//! 对外契约：400 带 `{ "errorsMessages": [{ "message", "field" }] }`，
//! 401/403/404/429 空响应体，其余意外错误一律 500。

use application::{ApplicationError, FieldError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, RepositoryError};
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(Vec<FieldError>),
    Unauthorized,
    Forbidden,
    NotFound,
    TooManyRequests,
    Internal,
}

impl ApiError {
    /// 单字段校验错误的便利构造。
    pub fn field_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::BadRequest(vec![FieldError::new(field, message)])
    }
}

#[derive(Debug, Serialize)]
struct FieldErrorBody {
    message: String,
    field: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorsMessagesBody {
    errors_messages: Vec<FieldErrorBody>,
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::Domain(DomainError::InvalidArgument { field, reason }) => {
                ApiError::BadRequest(vec![FieldError::new(field, reason)])
            }
            ApplicationError::Domain(DomainError::NotFound { .. }) => ApiError::NotFound,
            ApplicationError::Domain(DomainError::AlreadyExists { field, .. }) => {
                ApiError::BadRequest(vec![FieldError::new(field, "already exists")])
            }
            ApplicationError::Domain(DomainError::PermissionDenied { .. }) => ApiError::Forbidden,
            ApplicationError::Validation(errors) => ApiError::BadRequest(errors),
            ApplicationError::Authentication => ApiError::Unauthorized,
            ApplicationError::Forbidden => ApiError::Forbidden,
            ApplicationError::NotFound => ApiError::NotFound,
            ApplicationError::RateLimited => ApiError::TooManyRequests,
            ApplicationError::Repository(RepositoryError::NotFound) => ApiError::NotFound,
            // 唯一约束冲突只会在并发竞争时绕过服务层的预检查
            ApplicationError::Repository(RepositoryError::Conflict) => {
                ApiError::field_error("login", "already exists")
            }
            ApplicationError::Repository(RepositoryError::Storage { message }) => {
                tracing::error!(%message, "storage failure");
                ApiError::Internal
            }
            ApplicationError::Password(err) => {
                tracing::error!(error = %err, "password hashing failure");
                ApiError::Internal
            }
            ApplicationError::Token(err) => {
                tracing::error!(error = %err, "token issuance failure");
                ApiError::Internal
            }
            ApplicationError::Email(err) => {
                tracing::error!(error = %err, "email delivery failure");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(errors) => {
                let body = ErrorsMessagesBody {
                    errors_messages: errors
                        .into_iter()
                        .map(|err| FieldErrorBody {
                            message: err.message,
                            field: err.field,
                        })
                        .collect(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::Forbidden => StatusCode::FORBIDDEN.into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS.into_response(),
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_keep_field_order() {
        let error = ApiError::from(ApplicationError::Validation(vec![
            FieldError::new("login", "already exists"),
            FieldError::new("email", "already exists"),
        ]));
        let ApiError::BadRequest(errors) = error else {
            panic!("expected BadRequest");
        };
        assert_eq!(errors[0].field, "login");
        assert_eq!(errors[1].field, "email");
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            ApiError::from(ApplicationError::Authentication),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from(ApplicationError::Forbidden),
            ApiError::Forbidden
        ));
        assert!(matches!(
            ApiError::from(ApplicationError::NotFound),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from(ApplicationError::RateLimited),
            ApiError::TooManyRequests
        ));
    }
}
