//! /posts 路由
//!
//! 帖子 CRUD 是管理员操作；评论发表和点赞需要 Bearer；
//! 读取公开，登录用户能看到自己的 myStatus。

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use application::services::{CreateCommentRequest, PostInput};
use application::{CommentView, Paginated, PostView};
use domain::{BlogId, PostId, UserId};

use crate::auth::{optional_bearer, require_admin, require_bearer};
use crate::error::ApiError;
use crate::pagination::ListQuery;
use crate::routes::parse_like_status;
use crate::state::AppState;
use crate::validation::validate_payload;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list).post(create))
        .route("/posts/{id}", get(get_one).put(update).delete(remove))
        .route(
            "/posts/{id}/comments",
            get(list_comments).post(create_comment),
        )
        .route("/posts/{id}/like-status", axum::routing::put(like_status))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct PostPayload {
    #[validate(length(min = 1, max = 30, message = "must be 1-30 characters"))]
    title: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    short_description: String,
    #[validate(length(min = 1, max = 1000, message = "must be 1-1000 characters"))]
    content: String,
    blog_id: Uuid,
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

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Paginated<PostView>>, ApiError> {
    let viewer = optional_bearer(&state, &headers).map(UserId::from);
    let page = state
        .posts_service
        .list(None, query.pagination(), query.sort(), viewer)
        .await?;
    Ok(Json(page.into()))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PostPayload>,
) -> Result<(StatusCode, Json<PostView>), ApiError> {
    require_admin(&state, &headers)?;
    validate_payload(&payload)?;

    let view = state
        .posts_service
        .create(
            PostInput {
                title: payload.title,
                short_description: payload.short_description,
                content: payload.content,
                blog_id: BlogId::from(payload.blog_id),
            },
            None,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<PostView>, ApiError> {
    let viewer = optional_bearer(&state, &headers).map(UserId::from);
    let view = state.posts_service.get(PostId::from(id), viewer).await?;
    Ok(Json(view))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<PostPayload>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    validate_payload(&payload)?;

    state
        .posts_service
        .update(
            PostId::from(id),
            PostInput {
                title: payload.title,
                short_description: payload.short_description,
                content: payload.content,
                blog_id: BlogId::from(payload.blog_id),
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    state.posts_service.delete(PostId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Paginated<CommentView>>, ApiError> {
    let viewer = optional_bearer(&state, &headers).map(UserId::from);
    let page = state
        .comments_service
        .list_by_post(PostId::from(id), query.pagination(), query.sort(), viewer)
        .await?;
    Ok(Json(page.into()))
}

async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CommentPayload>,
) -> Result<(StatusCode, Json<CommentView>), ApiError> {
    let user_id = require_bearer(&state, &headers)?;
    validate_payload(&payload)?;

    // authorLogin 是写入时的快照，从当前用户资料取
    let me = state.auth_service.me(user_id).await?;
    let view = state
        .comments_service
        .create(CreateCommentRequest {
            post_id: PostId::from(id),
            author_id: UserId::from(user_id),
            author_login: me.login,
            content: payload.content,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
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
        .posts_service
        .set_like_status(PostId::from(id), UserId::from(user_id), me.login, requested)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
