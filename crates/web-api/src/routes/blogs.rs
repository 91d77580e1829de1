//! /blogs 路由
//!
//! 读取公开；写操作是管理员 Basic Auth。嵌套的 /blogs/{id}/posts
//! 在指定博客下读写帖子。

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use application::services::{BlogInput, PostInput};
use application::{BlogView, Paginated, PostView};
use domain::{BlogId, UserId};

use crate::auth::{optional_bearer, require_admin};
use crate::error::ApiError;
use crate::pagination::ListQuery;
use crate::state::AppState;
use crate::validation::validate_payload;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(list).post(create))
        .route("/blogs/{id}", get(get_one).put(update).delete(remove))
        .route("/blogs/{id}/posts", get(list_posts).post(create_post))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct BlogPayload {
    #[validate(length(min = 1, max = 15, message = "must be 1-15 characters"))]
    name: String,
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    description: String,
    #[validate(url(message = "invalid url"), length(max = 100, message = "too long"))]
    website_url: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct BlogPostPayload {
    #[validate(length(min = 1, max = 30, message = "must be 1-30 characters"))]
    title: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    short_description: String,
    #[validate(length(min = 1, max = 1000, message = "must be 1-1000 characters"))]
    content: String,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<BlogView>>, ApiError> {
    let page = state
        .blogs_service
        .list(query.name_term(), query.pagination(), query.sort())
        .await?;
    Ok(Json(page.into()))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BlogPayload>,
) -> Result<(StatusCode, Json<BlogView>), ApiError> {
    require_admin(&state, &headers)?;
    validate_payload(&payload)?;

    let view = state
        .blogs_service
        .create(BlogInput {
            name: payload.name,
            description: payload.description,
            website_url: payload.website_url,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BlogView>, ApiError> {
    let view = state.blogs_service.get(BlogId::from(id)).await?;
    Ok(Json(view))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<BlogPayload>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    validate_payload(&payload)?;

    state
        .blogs_service
        .update(
            BlogId::from(id),
            BlogInput {
                name: payload.name,
                description: payload.description,
                website_url: payload.website_url,
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
    state.blogs_service.delete(BlogId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_posts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Paginated<PostView>>, ApiError> {
    let viewer = optional_bearer(&state, &headers).map(UserId::from);
    let page = state
        .posts_service
        .list(
            Some(BlogId::from(id)),
            query.pagination(),
            query.sort(),
            viewer,
        )
        .await?;
    Ok(Json(page.into()))
}

async fn create_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<BlogPostPayload>,
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
                blog_id: BlogId::from(id),
            },
            None,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}
