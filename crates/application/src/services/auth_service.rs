use std::sync::Arc;

use chrono::Duration;
use domain::{
    DeviceId, DeviceSession, Login, SessionRepository, User, UserEmail, UserId, UserRepository,
};
use uuid::Uuid;

use crate::clock::Clock;
use crate::dto::MeView;
use crate::email::EmailSender;
use crate::error::ApplicationError;
use crate::password::PasswordHasher;
use crate::services::validate_password;
use crate::tokens::{RefreshClaims, TokenIssuer, TokenPair};

/// 邮箱确认码有效期。
const CONFIRMATION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub login: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub login_or_email: String,
    pub password: String,
    pub ip: String,
    pub device_name: String,
}

#[derive(Debug, Clone)]
pub struct NewPasswordRequest {
    pub new_password: String,
    pub recovery_code: Uuid,
}

pub struct AuthServiceDependencies {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_issuer: Arc<dyn TokenIssuer>,
    pub email_sender: Arc<dyn EmailSender>,
    pub clock: Arc<dyn Clock>,
}

/// 注册/登录/令牌旋转/找回密码。
///
/// 认证失败一律返回通用的 `Authentication`（401），
/// 不泄露登录名与密码哪个是错的。
pub struct AuthService {
    deps: AuthServiceDependencies,
}

impl AuthService {
    pub fn new(deps: AuthServiceDependencies) -> Self {
        Self { deps }
    }

    /// 自助注册：创建未确认用户并发送确认邮件。
    pub async fn register(&self, request: RegisterRequest) -> Result<(), ApplicationError> {
        let login = Login::parse(request.login)?;
        let email = UserEmail::parse(request.email)?;
        validate_password("password", &request.password)?;

        if self
            .deps
            .users
            .find_by_login(login.as_str())
            .await?
            .is_some()
        {
            return Err(ApplicationError::field_error("login", "already exists"));
        }
        if self
            .deps
            .users
            .find_by_email(email.as_str())
            .await?
            .is_some()
        {
            return Err(ApplicationError::field_error("email", "already exists"));
        }

        let password_hash = self.deps.password_hasher.hash(&request.password).await?;
        let now = self.deps.clock.now();
        let code = Uuid::new_v4();
        let user = User::register(
            UserId::generate(),
            login,
            email,
            password_hash,
            code,
            now + Duration::hours(CONFIRMATION_TTL_HOURS),
            now,
        );

        let stored = self.deps.users.create(user).await?;
        self.deps
            .email_sender
            .send_confirmation(&stored.email, code)
            .await?;
        Ok(())
    }

    pub async fn confirm_registration(&self, code: Uuid) -> Result<(), ApplicationError> {
        let mut user = self
            .deps
            .users
            .find_by_confirmation_code(code)
            .await?
            .ok_or_else(|| ApplicationError::field_error("code", "invalid confirmation code"))?;

        let now = self.deps.clock.now();
        if !user.can_confirm_with(code, now) {
            return Err(ApplicationError::field_error(
                "code",
                "confirmation code expired or already applied",
            ));
        }

        user.confirm();
        self.deps.users.update(user).await?;
        Ok(())
    }

    pub async fn resend_confirmation(&self, email: String) -> Result<(), ApplicationError> {
        let email = UserEmail::parse(email)?;
        let mut user = self
            .deps
            .users
            .find_by_email(email.as_str())
            .await?
            .ok_or_else(|| ApplicationError::field_error("email", "unknown email"))?;
        if user.is_confirmed {
            return Err(ApplicationError::field_error("email", "already confirmed"));
        }

        let now = self.deps.clock.now();
        let code = Uuid::new_v4();
        user.renew_confirmation_code(code, now + Duration::hours(CONFIRMATION_TTL_HOURS));
        let stored = self.deps.users.update(user).await?;
        self.deps
            .email_sender
            .send_confirmation(&stored.email, code)
            .await?;
        Ok(())
    }

    /// 登录：签发令牌对并开启设备会话。
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, ApplicationError> {
        let user = self
            .find_by_login_or_email(&request.login_or_email)
            .await?
            .ok_or(ApplicationError::Authentication)?;

        let password_ok = self
            .deps
            .password_hasher
            .verify(&request.password, &user.password)
            .await?;
        if !password_ok || !user.is_confirmed {
            return Err(ApplicationError::Authentication);
        }

        let device_id = DeviceId::generate();
        let now = self.deps.clock.now();
        let pair = self.deps.token_issuer.issue_pair(user.id, device_id, now)?;

        let session = DeviceSession::start(
            device_id,
            user.id,
            request.ip,
            request.device_name,
            pair.refresh_issued_at,
            pair.refresh_expires_at,
        );
        self.deps.sessions.create(session).await?;

        tracing::info!(user_id = %user.id, device_id = %device_id, "user logged in");
        Ok(pair)
    }

    /// 刷新令牌：验证签名/有效期，并核对会话的旋转标记与令牌 iat。
    /// 已用过的刷新令牌因旋转更新了 `last_active_at` 而不再匹配。
    pub async fn refresh(
        &self,
        refresh_token: &str,
        ip: String,
    ) -> Result<TokenPair, ApplicationError> {
        let (claims, mut session) = self.authorize_refresh(refresh_token).await?;

        let now = self.deps.clock.now();
        let pair = self.deps.token_issuer.issue_pair(
            session.user_id,
            DeviceId::from(claims.device_id),
            now,
        )?;

        session.rotate(ip, pair.refresh_issued_at, pair.refresh_expires_at);
        self.deps.sessions.update(session).await?;
        Ok(pair)
    }

    /// 登出：删除会话记录，未过期的刷新令牌随之失效。
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApplicationError> {
        let (claims, _session) = self.authorize_refresh(refresh_token).await?;
        self.deps
            .sessions
            .delete(DeviceId::from(claims.device_id))
            .await?;
        Ok(())
    }

    pub async fn me(&self, user_id: Uuid) -> Result<MeView, ApplicationError> {
        let user = self
            .deps
            .users
            .find_by_id(UserId::from(user_id))
            .await?
            .ok_or(ApplicationError::Authentication)?;
        Ok(MeView::from(&user))
    }

    /// 找回密码。为了不泄露邮箱是否注册，对未知邮箱也返回成功。
    pub async fn password_recovery(&self, email: String) -> Result<(), ApplicationError> {
        let email = UserEmail::parse(email)?;
        let Some(mut user) = self.deps.users.find_by_email(email.as_str()).await? else {
            return Ok(());
        };

        let code = Uuid::new_v4();
        user.set_recovery_code(code);
        let stored = self.deps.users.update(user).await?;
        self.deps
            .email_sender
            .send_recovery(&stored.email, code)
            .await?;
        Ok(())
    }

    pub async fn new_password(&self, request: NewPasswordRequest) -> Result<(), ApplicationError> {
        validate_password("newPassword", &request.new_password)?;
        let mut user = self
            .deps
            .users
            .find_by_recovery_code(request.recovery_code)
            .await?
            .ok_or_else(|| {
                ApplicationError::field_error("recoveryCode", "invalid recovery code")
            })?;

        let password_hash = self.deps.password_hasher.hash(&request.new_password).await?;
        user.set_password(password_hash);
        self.deps.users.update(user).await?;
        Ok(())
    }

    /// 验证刷新令牌并加载匹配的会话。
    /// 签名、有效期、会话存在性、归属和旋转标记任一不符都是 401。
    async fn authorize_refresh(
        &self,
        refresh_token: &str,
    ) -> Result<(RefreshClaims, DeviceSession), ApplicationError> {
        let claims = self
            .deps
            .token_issuer
            .verify_refresh(refresh_token)
            .map_err(|_| ApplicationError::Authentication)?;

        let session = self
            .deps
            .sessions
            .find_by_device(DeviceId::from(claims.device_id))
            .await?
            .ok_or(ApplicationError::Authentication)?;

        if Uuid::from(session.user_id) != claims.user_id
            || !session.matches_issued_at(claims.issued_at)
        {
            return Err(ApplicationError::Authentication);
        }

        Ok((claims, session))
    }

    async fn find_by_login_or_email(
        &self,
        login_or_email: &str,
    ) -> Result<Option<User>, ApplicationError> {
        if let Some(user) = self.deps.users.find_by_login(login_or_email).await? {
            return Ok(Some(user));
        }
        Ok(self.deps.users.find_by_email(login_or_email).await?)
    }
}
