use std::collections::HashMap;
use std::sync::Arc;

use domain::{
    Comment, CommentId, CommentRepository, Like, LikeRepository, LikeStatus, LikeTarget,
    LikeTransition, PaginatedResult, Pagination, PostId, PostRepository, SortConfig, UserId,
};
use uuid::Uuid;

use crate::clock::Clock;
use crate::dto::CommentView;
use crate::error::ApplicationError;

#[derive(Debug, Clone)]
pub struct CreateCommentRequest {
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_login: String,
    pub content: String,
}

pub struct CommentsServiceDependencies {
    pub comments: Arc<dyn CommentRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct CommentsService {
    deps: CommentsServiceDependencies,
}

impl CommentsService {
    pub fn new(deps: CommentsServiceDependencies) -> Self {
        Self { deps }
    }

    /// 在帖子下发表评论。authorLogin 取写入时的快照。
    pub async fn create(
        &self,
        request: CreateCommentRequest,
    ) -> Result<CommentView, ApplicationError> {
        if self.deps.posts.find_by_id(request.post_id).await?.is_none() {
            return Err(ApplicationError::NotFound);
        }

        let now = self.deps.clock.now();
        let comment = Comment::create(
            CommentId::generate(),
            request.content,
            request.post_id,
            request.author_id,
            request.author_login,
            now,
        )?;
        let stored = self.deps.comments.create(comment).await?;
        // 新评论必然没有点赞记录
        Ok(CommentView::assemble(
            &stored,
            Default::default(),
            LikeStatus::None,
        ))
    }

    pub async fn get(
        &self,
        id: CommentId,
        viewer: Option<UserId>,
    ) -> Result<CommentView, ApplicationError> {
        let comment = self
            .deps
            .comments
            .find_by_id(id)
            .await?
            .ok_or(ApplicationError::NotFound)?;

        let target_id = Uuid::from(comment.id);
        let counts = self
            .deps
            .likes
            .counts_many(LikeTarget::Comment, vec![target_id])
            .await?;
        let statuses = self.viewer_statuses(vec![target_id], viewer).await?;

        Ok(CommentView::assemble(
            &comment,
            counts.get(&target_id).copied().unwrap_or_default(),
            statuses
                .get(&target_id)
                .copied()
                .unwrap_or(LikeStatus::None),
        ))
    }

    pub async fn list_by_post(
        &self,
        post_id: PostId,
        pagination: Pagination,
        sort: SortConfig,
        viewer: Option<UserId>,
    ) -> Result<PaginatedResult<CommentView>, ApplicationError> {
        if self.deps.posts.find_by_id(post_id).await?.is_none() {
            return Err(ApplicationError::NotFound);
        }

        let page = self
            .deps
            .comments
            .list_by_post(post_id, pagination, sort)
            .await?;
        let ids: Vec<Uuid> = page.items.iter().map(|c| c.id.into()).collect();

        let counts = self
            .deps
            .likes
            .counts_many(LikeTarget::Comment, ids.clone())
            .await?;
        let statuses = self.viewer_statuses(ids, viewer).await?;

        let views = page
            .items
            .iter()
            .map(|comment| {
                let id = Uuid::from(comment.id);
                CommentView::assemble(
                    comment,
                    counts.get(&id).copied().unwrap_or_default(),
                    statuses.get(&id).copied().unwrap_or(LikeStatus::None),
                )
            })
            .collect();

        Ok(PaginatedResult {
            items: views,
            total_count: page.total_count,
            page: page.page,
            page_size: page.page_size,
            pages_count: page.pages_count,
        })
    }

    /// 仅作者可编辑；他人 → Forbidden，不存在 → NotFound。
    pub async fn update(
        &self,
        id: CommentId,
        editor: UserId,
        content: String,
    ) -> Result<(), ApplicationError> {
        let mut comment = self
            .deps
            .comments
            .find_by_id(id)
            .await?
            .ok_or(ApplicationError::NotFound)?;
        if !comment.is_authored_by(editor) {
            return Err(ApplicationError::Forbidden);
        }
        comment.update(content)?;
        self.deps.comments.update(comment).await?;
        Ok(())
    }

    pub async fn delete(&self, id: CommentId, editor: UserId) -> Result<(), ApplicationError> {
        let comment = self
            .deps
            .comments
            .find_by_id(id)
            .await?
            .ok_or(ApplicationError::NotFound)?;
        if !comment.is_authored_by(editor) {
            return Err(ApplicationError::Forbidden);
        }
        self.deps.comments.delete(id).await?;
        Ok(())
    }

    /// 与帖子点赞共用同一状态机，目标类型不同。
    pub async fn set_like_status(
        &self,
        comment_id: CommentId,
        user_id: UserId,
        user_login: String,
        requested: LikeStatus,
    ) -> Result<(), ApplicationError> {
        if self.deps.comments.find_by_id(comment_id).await?.is_none() {
            return Err(ApplicationError::NotFound);
        }

        let target_id = Uuid::from(comment_id);
        let current = self
            .deps
            .likes
            .find(LikeTarget::Comment, target_id, user_id)
            .await?
            .map(|like| like.status)
            .unwrap_or(LikeStatus::None);

        match LikeTransition::plan(current, requested) {
            LikeTransition::Keep => Ok(()),
            LikeTransition::Upsert(status) => {
                let like = Like {
                    target: LikeTarget::Comment,
                    target_id,
                    user_id,
                    user_login,
                    status,
                    added_at: self.deps.clock.now(),
                };
                self.deps.likes.upsert(like).await?;
                Ok(())
            }
            LikeTransition::Remove => {
                self.deps
                    .likes
                    .remove(LikeTarget::Comment, target_id, user_id)
                    .await?;
                Ok(())
            }
        }
    }

    async fn viewer_statuses(
        &self,
        ids: Vec<Uuid>,
        viewer: Option<UserId>,
    ) -> Result<HashMap<Uuid, LikeStatus>, ApplicationError> {
        match viewer {
            Some(user_id) => Ok(self
                .deps
                .likes
                .statuses_for_user(LikeTarget::Comment, ids, user_id)
                .await?),
            None => Ok(HashMap::new()),
        }
    }
}
