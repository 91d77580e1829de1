use std::sync::Arc;

use domain::{
    BlogId, Like, LikeRepository, LikeStatus, LikeTarget, Pagination, Post, PostId,
    PostRepository, SortConfig, UserId,
};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::ApplicationError;
use crate::services::blogs_service::{BlogInput, BlogsService, BlogsServiceDependencies};
use crate::services::test_support::{FixedClock, MemoryBlogs, MemoryComments, MemoryLikes, MemoryPosts};

struct Fixture {
    service: BlogsService,
    posts: Arc<MemoryPosts>,
    likes: Arc<MemoryLikes>,
    clock: Arc<FixedClock>,
}

fn fixture() -> Fixture {
    let likes = Arc::new(MemoryLikes::default());
    let comments = MemoryComments::linked_to(&likes);
    let posts = Arc::new(MemoryPosts::linked_to(&comments, &likes));
    let clock = Arc::new(FixedClock::default());
    let service = BlogsService::new(BlogsServiceDependencies {
        blogs: Arc::new(MemoryBlogs::default()),
        posts: posts.clone(),
        clock: clock.clone(),
    });
    Fixture {
        service,
        posts,
        likes,
        clock,
    }
}

fn input(name: &str) -> BlogInput {
    BlogInput {
        name: name.into(),
        description: "a blog".into(),
        website_url: "https://example.com".into(),
    }
}

#[tokio::test]
async fn create_and_get_roundtrip() {
    let fx = fixture();
    let created = fx.service.create(input("tech")).await.unwrap();

    let fetched = fx.service.get(BlogId::from(created.id)).await.unwrap();
    assert_eq!(fetched.name, "tech");
    assert_eq!(fetched.website_url, "https://example.com");
    assert!(!fetched.is_membership);
}

#[tokio::test]
async fn get_missing_blog_is_not_found() {
    let fx = fixture();
    let result = fx.service.get(BlogId::from(Uuid::new_v4())).await;
    assert!(matches!(result, Err(ApplicationError::NotFound)));
}

#[tokio::test]
async fn create_rejects_invalid_url() {
    let fx = fixture();
    let result = fx
        .service
        .create(BlogInput {
            name: "tech".into(),
            description: "d".into(),
            website_url: "http://insecure.com".into(),
        })
        .await;
    assert!(matches!(result, Err(ApplicationError::Domain(_))));
}

#[tokio::test]
async fn update_replaces_fields() {
    let fx = fixture();
    let created = fx.service.create(input("tech")).await.unwrap();

    fx.service
        .update(
            BlogId::from(created.id),
            BlogInput {
                name: "news".into(),
                description: "renamed".into(),
                website_url: "https://news.example.com".into(),
            },
        )
        .await
        .unwrap();

    let fetched = fx.service.get(BlogId::from(created.id)).await.unwrap();
    assert_eq!(fetched.name, "news");
    assert_eq!(fetched.description, "renamed");
}

#[tokio::test]
async fn update_missing_blog_is_not_found() {
    let fx = fixture();
    let result = fx
        .service
        .update(BlogId::from(Uuid::new_v4()), input("tech"))
        .await;
    assert!(matches!(result, Err(ApplicationError::NotFound)));
}

#[tokio::test]
async fn list_filters_by_name_case_insensitively() {
    let fx = fixture();
    fx.service.create(input("TechBlog")).await.unwrap();
    fx.service.create(input("cooking")).await.unwrap();

    let page = fx
        .service
        .list(
            Some("tech".into()),
            Pagination::default(),
            SortConfig::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].name, "TechBlog");
}

#[tokio::test]
async fn delete_cascades_posts() {
    let fx = fixture();
    let created = fx.service.create(input("tech")).await.unwrap();
    let blog_id = BlogId::from(created.id);

    let post = Post::create(
        PostId::generate(),
        "title",
        "short",
        "content",
        blog_id,
        "tech",
        fx.clock.now(),
    )
    .unwrap();
    let post_id = post.id;
    fx.posts.create(post).await.unwrap();

    fx.service.delete(blog_id).await.unwrap();

    assert!(matches!(
        fx.service.get(blog_id).await,
        Err(ApplicationError::NotFound)
    ));
    // 博客删除后其帖子一并消失
    assert!(fx.posts.find_by_id(post_id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_cascade_removes_like_rows_of_posts() {
    let fx = fixture();
    let created = fx.service.create(input("tech")).await.unwrap();
    let blog_id = BlogId::from(created.id);

    let post = Post::create(
        PostId::generate(),
        "title",
        "short",
        "content",
        blog_id,
        "tech",
        fx.clock.now(),
    )
    .unwrap();
    let post_id = post.id;
    fx.posts.create(post).await.unwrap();
    fx.likes
        .upsert(Like {
            target: LikeTarget::Post,
            target_id: Uuid::from(post_id),
            user_id: UserId::generate(),
            user_login: "alice".into(),
            status: LikeStatus::Like,
            added_at: fx.clock.now(),
        })
        .await
        .unwrap();

    fx.service.delete(blog_id).await.unwrap();

    // 帖子级联删除后点赞行也不残留
    let counts = fx
        .likes
        .counts_many(LikeTarget::Post, vec![Uuid::from(post_id)])
        .await
        .unwrap();
    assert_eq!(counts.get(&Uuid::from(post_id)).unwrap().likes, 0);
}

#[tokio::test]
async fn delete_missing_blog_is_not_found() {
    let fx = fixture();
    let result = fx.service.delete(BlogId::from(Uuid::new_v4())).await;
    assert!(matches!(result, Err(ApplicationError::NotFound)));
}
