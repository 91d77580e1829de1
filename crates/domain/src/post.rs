use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{BlogId, PostId, Timestamp};

/// 帖子实体
///
/// `blog_name` 是写入时的快照，源博客改名后不会自动更新。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub short_description: String,
    pub content: String,
    pub blog_id: BlogId,
    pub blog_name: String,
    pub created_at: Timestamp,
}

impl Post {
    pub fn create(
        id: PostId,
        title: impl Into<String>,
        short_description: impl Into<String>,
        content: impl Into<String>,
        blog_id: BlogId,
        blog_name: impl Into<String>,
        now: Timestamp,
    ) -> DomainResult<Self> {
        let (title, short_description, content) =
            validate_fields(title.into(), short_description.into(), content.into())?;
        Ok(Self {
            id,
            title,
            short_description,
            content,
            blog_id,
            blog_name: blog_name.into(),
            created_at: now,
        })
    }

    pub fn update(
        &mut self,
        title: impl Into<String>,
        short_description: impl Into<String>,
        content: impl Into<String>,
        blog_id: BlogId,
        blog_name: impl Into<String>,
    ) -> DomainResult<()> {
        let (title, short_description, content) =
            validate_fields(title.into(), short_description.into(), content.into())?;
        self.title = title;
        self.short_description = short_description;
        self.content = content;
        self.blog_id = blog_id;
        self.blog_name = blog_name.into();
        Ok(())
    }
}

fn validate_fields(
    title: String,
    short_description: String,
    content: String,
) -> DomainResult<(String, String, String)> {
    let title = title.trim().to_owned();
    if title.is_empty() {
        return Err(DomainError::invalid_argument("title", "cannot be empty"));
    }
    if title.len() > 30 {
        return Err(DomainError::invalid_argument("title", "too long"));
    }
    if short_description.is_empty() {
        return Err(DomainError::invalid_argument(
            "shortDescription",
            "cannot be empty",
        ));
    }
    if short_description.len() > 100 {
        return Err(DomainError::invalid_argument("shortDescription", "too long"));
    }
    if content.is_empty() {
        return Err(DomainError::invalid_argument("content", "cannot be empty"));
    }
    if content.len() > 1000 {
        return Err(DomainError::invalid_argument("content", "too long"));
    }
    Ok((title, short_description, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn create_snapshots_blog_name() {
        let post = Post::create(
            PostId::generate(),
            "title",
            "short",
            "content",
            BlogId::generate(),
            "tech blog",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(post.blog_name, "tech blog");
    }

    #[test]
    fn create_rejects_invalid_fields() {
        let blog_id = BlogId::generate();
        let now = Utc::now();
        assert!(Post::create(PostId::generate(), "", "s", "c", blog_id, "b", now).is_err());
        assert!(Post::create(
            PostId::generate(),
            "a".repeat(31),
            "s",
            "c",
            blog_id,
            "b",
            now
        )
        .is_err());
        assert!(Post::create(PostId::generate(), "t", "", "c", blog_id, "b", now).is_err());
        assert!(Post::create(PostId::generate(), "t", "s", "", blog_id, "b", now).is_err());
    }
}
