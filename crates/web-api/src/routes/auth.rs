//! /auth 路由
//!
//! 注册、确认、登录、令牌旋转、找回密码。除 refresh-token/logout/me 外
//! 的入口都经过固定窗口限流；刷新令牌通过 httpOnly cookie 往返。

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use application::services::{LoginRequest, NewPasswordRequest, RegisterRequest};
use application::{AccessTokenView, MeView, TokenPair};

use crate::auth::{client_ip, device_name, refresh_cookie, refresh_cookie_value, require_bearer};
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::validate_payload;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/registration", post(registration))
        .route(
            "/auth/registration-confirmation",
            post(registration_confirmation),
        )
        .route(
            "/auth/registration-email-resending",
            post(registration_email_resending),
        )
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/logout", post(logout))
        .route("/auth/password-recovery", post(password_recovery))
        .route("/auth/new-password", post(new_password))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct RegistrationPayload {
    #[validate(length(min = 3, max = 30, message = "must be 3-30 characters"))]
    login: String,
    #[validate(email(message = "invalid format"))]
    email: String,
    #[validate(length(min = 6, max = 20, message = "must be 6-20 characters"))]
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationPayload {
    code: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct EmailPayload {
    #[validate(email(message = "invalid format"))]
    email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload {
    login_or_email: String,
    password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct NewPasswordPayload {
    #[validate(length(min = 6, max = 20, message = "must be 6-20 characters"))]
    new_password: String,
    recovery_code: String,
}

async fn registration(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<RegistrationPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .throttle
        .check_and_record(client_ip(&headers, addr), "/auth/registration")
        .await?;
    validate_payload(&payload)?;

    state
        .auth_service
        .register(RegisterRequest {
            login: payload.login,
            email: payload.email,
            password: payload.password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn registration_confirmation(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<ConfirmationPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .throttle
        .check_and_record(
            client_ip(&headers, addr),
            "/auth/registration-confirmation",
        )
        .await?;

    let code = parse_code(&payload.code, "code")?;
    state.auth_service.confirm_registration(code).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn registration_email_resending(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<EmailPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .throttle
        .check_and_record(
            client_ip(&headers, addr),
            "/auth/registration-email-resending",
        )
        .await?;
    validate_payload(&payload)?;

    state.auth_service.resend_confirmation(payload.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ip = client_ip(&headers, addr);
    state.throttle.check_and_record(ip.clone(), "/auth/login").await?;

    let pair = state
        .auth_service
        .login(LoginRequest {
            login_or_email: payload.login_or_email,
            password: payload.password,
            ip,
            device_name: device_name(&headers),
        })
        .await?;
    Ok(token_pair_response(pair))
}

async fn refresh_token(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = refresh_cookie(&headers)?;
    let pair = state
        .auth_service
        .refresh(&token, client_ip(&headers, addr))
        .await?;
    Ok(token_pair_response(pair))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = refresh_cookie(&headers)?;
    state.auth_service.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn password_recovery(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<EmailPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .throttle
        .check_and_record(client_ip(&headers, addr), "/auth/password-recovery")
        .await?;
    validate_payload(&payload)?;

    state.auth_service.password_recovery(payload.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn new_password(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<NewPasswordPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .throttle
        .check_and_record(client_ip(&headers, addr), "/auth/new-password")
        .await?;
    validate_payload(&payload)?;

    let code = parse_code(&payload.recovery_code, "recoveryCode")?;
    state
        .auth_service
        .new_password(NewPasswordRequest {
            new_password: payload.new_password,
            recovery_code: code,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeView>, ApiError> {
    let user_id = require_bearer(&state, &headers)?;
    let view = state.auth_service.me(user_id).await?;
    Ok(Json(view))
}

/// 登录与刷新共用的响应：访问令牌在 JSON 体里，
/// 刷新令牌写进 httpOnly cookie。
fn token_pair_response(pair: TokenPair) -> impl IntoResponse {
    let max_age = (pair.refresh_expires_at - pair.refresh_issued_at).num_seconds();
    (
        [(
            header::SET_COOKIE,
            refresh_cookie_value(&pair.refresh_token, max_age),
        )],
        Json(AccessTokenView {
            access_token: pair.access_token,
        }),
    )
}

/// 确认码/恢复码是 UUID，非法格式按字段错误返回。
fn parse_code(value: &str, field: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value).map_err(|_| ApiError::field_error(field, "invalid format"))
}
