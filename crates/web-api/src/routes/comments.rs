//! /comments 路由
//!
//! 评论读取公开；编辑和删除只允许作者本人，点赞需要 Bearer。

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use application::CommentView;
use domain::{CommentId, UserId};

use crate::auth::{optional_bearer, require_bearer};
use crate::error::ApiError;
use crate::routes::parse_like_status;
use crate::state::AppState;
use crate::validation::validate_payload;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/comments/{id}", get(get_one).put(update).delete(remove))
        .route("/comments/{id}/like-status", put(like_status))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CommentPayload {
    #[validate(length(min = 20, max = 300, message = "must be 20-300 characters"))]
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikeStatusPayload {
    like_status: String,
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<CommentView>, ApiError> {
    let viewer = optional_bearer(&state, &headers).map(UserId::from);
    let view = state
        .comments_service
        .get(CommentId::from(id), viewer)
        .await?;
    Ok(Json(view))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CommentPayload>,
) -> Result<StatusCode, ApiError> {
    let user_id = require_bearer(&state, &headers)?;
    validate_payload(&payload)?;

    state
        .comments_service
        .update(CommentId::from(id), UserId::from(user_id), payload.content)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let user_id = require_bearer(&state, &headers)?;
    state
        .comments_service
        .delete(CommentId::from(id), UserId::from(user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn like_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<LikeStatusPayload>,
) -> Result<StatusCode, ApiError> {
    let user_id = require_bearer(&state, &headers)?;
    let requested = parse_like_status(&payload.like_status)?;

    let me = state.auth_service.me(user_id).await?;
    state
        .comments_service
        .set_like_status(
            CommentId::from(id),
            UserId::from(user_id),
            me.login,
            requested,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
