//! 请求凭据提取
//!
//! 三种凭据来源：`Authorization: Bearer`（访问令牌）、
//! `refreshToken` httpOnly cookie（刷新令牌）、
//! `Authorization: Basic`（管理员固定凭证）。

use std::net::SocketAddr;

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

const REFRESH_COOKIE: &str = "refreshToken";

/// 从 Authorization 头取出 Bearer 令牌。
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// 必选 Bearer 鉴权：缺失、格式不对、验签失败都是 401。
pub(crate) fn require_bearer(state: &AppState, headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    let claims = state
        .token_issuer
        .verify_access(token)
        .map_err(|_| ApiError::Unauthorized)?;
    Ok(claims.user_id)
}

/// 可选 Bearer：匿名读取点赞信息时 myStatus 为 None。
/// 无效令牌按匿名处理而不是 401。
pub(crate) fn optional_bearer(state: &AppState, headers: &HeaderMap) -> Option<Uuid> {
    let token = bearer_token(headers)?;
    state
        .token_issuer
        .verify_access(token)
        .ok()
        .map(|claims| claims.user_id)
}

/// 管理员 Basic Auth，凭证来自配置。
pub(crate) fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let encoded = header.strip_prefix("Basic ").ok_or(ApiError::Unauthorized)?;
    let decoded = BASE64
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or(ApiError::Unauthorized)?;

    let expected = format!("{}:{}", state.admin.login, state.admin.password);
    if decoded != expected {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

/// 从 Cookie 头取出刷新令牌。
pub(crate) fn refresh_cookie(headers: &HeaderMap) -> Result<String, ApiError> {
    let cookies = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == REFRESH_COOKIE)
        .map(|(_, value)| value.to_owned())
        .ok_or(ApiError::Unauthorized)
}

/// 刷新令牌 cookie 的 Set-Cookie 值。
pub(crate) fn refresh_cookie_value(token: &str, max_age_seconds: i64) -> String {
    format!("{REFRESH_COOKIE}={token}; Path=/; HttpOnly; Secure; Max-Age={max_age_seconds}")
}

/// 客户端 IP：反向代理传来的 X-Forwarded-For 优先，取链路首个地址。
pub(crate) fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_owned())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}

/// 设备名取 User-Agent，缺失时用占位值。
pub(crate) fn device_name(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| "unknown device".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn refresh_cookie_is_found_among_others() {
        let headers = headers_with("cookie", "theme=dark; refreshToken=abc.def.ghi; lang=en");
        assert_eq!(refresh_cookie(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_refresh_cookie_is_unauthorized() {
        let headers = headers_with("cookie", "theme=dark");
        assert!(matches!(
            refresh_cookie(&headers),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            refresh_cookie(&HeaderMap::new()),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn forwarded_ip_takes_precedence() {
        let addr: SocketAddr = "10.0.0.1:9000".parse().unwrap();
        let headers = headers_with("x-forwarded-for", "203.0.113.7, 10.0.0.2");
        assert_eq!(client_ip(&headers, addr), "203.0.113.7");
        assert_eq!(client_ip(&HeaderMap::new(), addr), "10.0.0.1");
    }

    #[test]
    fn device_name_falls_back_when_absent() {
        let headers = headers_with("user-agent", "Mozilla/5.0");
        assert_eq!(device_name(&headers), "Mozilla/5.0");
        assert_eq!(device_name(&HeaderMap::new()), "unknown device");
    }

    #[test]
    fn cookie_value_is_http_only() {
        let value = refresh_cookie_value("token123", 20);
        assert!(value.starts_with("refreshToken=token123;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Max-Age=20"));
    }
}
