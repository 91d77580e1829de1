//! /security/devices 路由
//!
//! 设备会话管理的凭据是刷新令牌 cookie，不是访问令牌。

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use uuid::Uuid;

use application::DeviceView;

use crate::auth::refresh_cookie;
use crate::error::ApiError;
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/security/devices", get(list).delete(delete_others))
        .route("/security/devices/{id}", delete(delete_device))
}

async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<DeviceView>>, ApiError> {
    let token = refresh_cookie(&headers)?;
    let devices = state.devices_service.list(&token).await?;
    Ok(Json(devices))
}

async fn delete_others(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = refresh_cookie(&headers)?;
    state.devices_service.delete_others(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_device(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = refresh_cookie(&headers)?;
    state.devices_service.delete_device(&token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
