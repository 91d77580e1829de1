use std::sync::Arc;

use domain::{
    Login, PaginatedResult, Pagination, SortConfig, User, UserEmail, UserId, UserListFilter,
    UserRepository,
};

use crate::clock::Clock;
use crate::dto::UserView;
use crate::error::{ApplicationError, FieldError};
use crate::password::PasswordHasher;
use crate::services::validate_password;

#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub login: String,
    pub email: String,
    pub password: String,
}

pub struct UsersServiceDependencies {
    pub users: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

/// 用户管理（管理员侧）：创建、分页列表、删除。
pub struct UsersService {
    deps: UsersServiceDependencies,
}

impl UsersService {
    pub fn new(deps: UsersServiceDependencies) -> Self {
        Self { deps }
    }

    /// 管理员创建用户：跳过邮箱确认流程，直接可登录。
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserView, ApplicationError> {
        let login = Login::parse(request.login)?;
        let email = UserEmail::parse(request.email)?;
        validate_password("password", &request.password)?;
        self.ensure_unique(&login, &email).await?;

        let password_hash = self.deps.password_hasher.hash(&request.password).await?;
        let now = self.deps.clock.now();
        let user = User::create_confirmed(UserId::generate(), login, email, password_hash, now);

        let stored = self.deps.users.create(user).await?;
        Ok(UserView::from(&stored))
    }

    pub async fn list(
        &self,
        filter: UserListFilter,
        pagination: Pagination,
        sort: SortConfig,
    ) -> Result<PaginatedResult<UserView>, ApplicationError> {
        let page = self.deps.users.list(filter, pagination, sort).await?;
        Ok(page.map(|user| UserView::from(&user)))
    }

    pub async fn delete(&self, id: UserId) -> Result<(), ApplicationError> {
        let deleted = self.deps.users.delete(id).await?;
        if !deleted {
            return Err(ApplicationError::NotFound);
        }
        Ok(())
    }

    /// 登录名与邮箱全局唯一，冲突以字段级错误返回。
    async fn ensure_unique(
        &self,
        login: &Login,
        email: &UserEmail,
    ) -> Result<(), ApplicationError> {
        let mut errors = Vec::new();
        if self
            .deps
            .users
            .find_by_login(login.as_str())
            .await?
            .is_some()
        {
            errors.push(FieldError::new("login", "already exists"));
        }
        if self
            .deps
            .users
            .find_by_email(email.as_str())
            .await?
            .is_some()
        {
            errors.push(FieldError::new("email", "already exists"));
        }
        if !errors.is_empty() {
            return Err(ApplicationError::Validation(errors));
        }
        Ok(())
    }
}
