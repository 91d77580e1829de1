//! /users 路由（管理员）
//!
//! 管理员直接创建已确认用户、分页检索、删除。全部走 Basic Auth。

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use application::services::CreateUserRequest;
use application::{Paginated, UserView};
use domain::UserId;

use crate::auth::require_admin;
use crate::error::ApiError;
use crate::pagination::ListQuery;
use crate::state::AppState;
use crate::validation::validate_payload;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/{id}", axum::routing::delete(remove))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateUserPayload {
    #[validate(length(min = 3, max = 30, message = "must be 3-30 characters"))]
    login: String,
    #[validate(email(message = "invalid format"))]
    email: String,
    #[validate(length(min = 6, max = 20, message = "must be 6-20 characters"))]
    password: String,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Paginated<UserView>>, ApiError> {
    require_admin(&state, &headers)?;
    let page = state
        .users_service
        .list(query.user_filter(), query.pagination(), query.sort())
        .await?;
    Ok(Json(page.into()))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    require_admin(&state, &headers)?;
    validate_payload(&payload)?;

    let view = state
        .users_service
        .create(CreateUserRequest {
            login: payload.login,
            email: payload.email,
            password: payload.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    state.users_service.delete(UserId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
