use std::sync::Arc;

use domain::{
    Blog, BlogId, BlogRepository, PaginatedResult, Pagination, PostRepository, SortConfig,
};

use crate::clock::Clock;
use crate::dto::BlogView;
use crate::error::ApplicationError;

#[derive(Debug, Clone)]
pub struct BlogInput {
    pub name: String,
    pub description: String,
    pub website_url: String,
}

pub struct BlogsServiceDependencies {
    pub blogs: Arc<dyn BlogRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct BlogsService {
    deps: BlogsServiceDependencies,
}

impl BlogsService {
    pub fn new(deps: BlogsServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn create(&self, input: BlogInput) -> Result<BlogView, ApplicationError> {
        let now = self.deps.clock.now();
        let blog = Blog::create(
            BlogId::generate(),
            input.name,
            input.description,
            input.website_url,
            now,
        )?;
        let stored = self.deps.blogs.create(blog).await?;
        Ok(BlogView::from(&stored))
    }

    pub async fn get(&self, id: BlogId) -> Result<BlogView, ApplicationError> {
        let blog = self
            .deps
            .blogs
            .find_by_id(id)
            .await?
            .ok_or(ApplicationError::NotFound)?;
        Ok(BlogView::from(&blog))
    }

    pub async fn list(
        &self,
        name_term: Option<String>,
        pagination: Pagination,
        sort: SortConfig,
    ) -> Result<PaginatedResult<BlogView>, ApplicationError> {
        let page = self.deps.blogs.list(name_term, pagination, sort).await?;
        Ok(page.map(|blog| BlogView::from(&blog)))
    }

    pub async fn update(&self, id: BlogId, input: BlogInput) -> Result<(), ApplicationError> {
        let mut blog = self
            .deps
            .blogs
            .find_by_id(id)
            .await?
            .ok_or(ApplicationError::NotFound)?;
        blog.update(input.name, input.description, input.website_url)?;
        self.deps.blogs.update(blog).await?;
        Ok(())
    }

    /// 删除博客并级联删除其全部帖子（帖子的评论由外键级联删除）。
    pub async fn delete(&self, id: BlogId) -> Result<(), ApplicationError> {
        if self.deps.blogs.find_by_id(id).await?.is_none() {
            return Err(ApplicationError::NotFound);
        }
        let removed_posts = self.deps.posts.delete_by_blog(id).await?;
        self.deps.blogs.delete(id).await?;
        tracing::info!(blog_id = %id, removed_posts, "blog deleted with cascade");
        Ok(())
    }
}
