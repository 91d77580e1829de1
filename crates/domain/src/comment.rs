use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{CommentId, PostId, Timestamp, UserId};

/// 评论实体
///
/// `author_login` 是写入时的快照，作者改名后不会自动更新。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_login: String,
    pub created_at: Timestamp,
}

impl Comment {
    pub fn create(
        id: CommentId,
        content: impl Into<String>,
        post_id: PostId,
        author_id: UserId,
        author_login: impl Into<String>,
        now: Timestamp,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            content: validate_content(content.into())?,
            post_id,
            author_id,
            author_login: author_login.into(),
            created_at: now,
        })
    }

    pub fn update(&mut self, content: impl Into<String>) -> DomainResult<()> {
        self.content = validate_content(content.into())?;
        Ok(())
    }

    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }
}

fn validate_content(content: String) -> DomainResult<String> {
    if content.len() < 20 {
        return Err(DomainError::invalid_argument("content", "too short"));
    }
    if content.len() > 300 {
        return Err(DomainError::invalid_argument("content", "too long"));
    }
    Ok(content)
}
