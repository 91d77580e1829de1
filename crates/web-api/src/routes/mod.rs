//! 路由装配
//!
//! 契约路径都在根层级（/auth、/blogs、/posts、/comments、/users、
//! /security、/testing），外加 /health 探活。

use axum::{http::StatusCode, routing::get, Router};
use domain::LikeStatus;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::AppState;

mod auth;
mod blogs;
mod comments;
mod posts;
mod security;
mod testing;
mod users;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(blogs::routes())
        .merge(posts::routes())
        .merge(comments::routes())
        .merge(users::routes())
        .merge(security::routes())
        .merge(testing::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// likeStatus 的取值受限，非法值要走 400 而不是请求体反序列化失败。
pub(super) fn parse_like_status(value: &str) -> Result<LikeStatus, ApiError> {
    match value {
        "None" => Ok(LikeStatus::None),
        "Like" => Ok(LikeStatus::Like),
        "Dislike" => Ok(LikeStatus::Dislike),
        _ => Err(ApiError::field_error(
            "likeStatus",
            "must be one of None, Like, Dislike",
        )),
    }
}
