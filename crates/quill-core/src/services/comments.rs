use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Comment, CommentThread, MODERATION_PER_PAGE, NewComment, Page, PageRequest, Viewer,
    build_threads, validate_comment_content,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{BaseRepository, CommentRepository, PostRepository};

/// Comment threads and moderation.
#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    /// The comment tree of a post as `viewer` sees it.
    pub async fn threads(
        &self,
        viewer: &Viewer,
        post_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<CommentThread>, DomainError> {
        self.ensure_post_visible(viewer, post_id, now).await?;
        let comments = self.comments.find_by_post_id(post_id).await?;
        Ok(build_threads(comments, viewer))
    }

    /// Create a comment or reply. It starts unapproved.
    pub async fn create(
        &self,
        viewer: &Viewer,
        input: NewComment,
        now: DateTime<Utc>,
    ) -> Result<Comment, DomainError> {
        let user_id = viewer.require_user()?;
        let content = validate_comment_content(&input.content)?;
        self.ensure_post_visible(viewer, input.post_id, now).await?;

        if let Some(parent_id) = input.parent_id {
            let parent = self
                .comments
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| DomainError::validation("parent comment does not exist"))?;
            if parent.post_id != input.post_id {
                return Err(DomainError::validation(
                    "parent comment belongs to a different post",
                ));
            }
            if parent.is_reply() {
                return Err(DomainError::validation("replies cannot be replied to"));
            }
        }

        let comment = Comment::new(input.post_id, user_id, input.parent_id, content, now);
        let saved = match self.comments.save(comment).await {
            Ok(saved) => saved,
            Err(RepoError::ForeignKey(_)) => {
                return Err(self.missing_reference(&input, user_id).await);
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(
            comment_id = %saved.id,
            post_id = %saved.post_id,
            reply = saved.is_reply(),
            "Comment submitted for moderation"
        );
        Ok(saved)
    }

    /// Flip the approval flag. Administrators only.
    pub async fn toggle_approval(
        &self,
        viewer: &Viewer,
        comment_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Comment, DomainError> {
        viewer.ensure_admin()?;
        let mut comment = self.find(comment_id).await?;
        comment.toggle_approval(now);

        let saved = self.comments.save(comment).await?;
        tracing::info!(comment_id = %saved.id, approved = saved.is_approved, "Comment moderated");
        Ok(saved)
    }

    /// Delete a comment and its replies. Author or administrator only.
    pub async fn delete(&self, viewer: &Viewer, comment_id: Uuid) -> Result<(), DomainError> {
        viewer.require_user()?;
        let comment = self.find(comment_id).await?;
        viewer.ensure_can_manage(comment.user_id, "comment")?;

        self.comments.delete(comment.id).await?;
        tracing::info!(comment_id = %comment.id, "Comment deleted");
        Ok(())
    }

    /// Every comment, approved or pending, newest first. Administrators only.
    pub async fn moderation_queue(
        &self,
        viewer: &Viewer,
        page: u64,
    ) -> Result<Page<Comment>, DomainError> {
        viewer.ensure_admin()?;
        let request = PageRequest::new(page, MODERATION_PER_PAGE);
        Ok(self.comments.list_all(request).await?)
    }

    async fn find(&self, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }

    /// Work out which row vanished between the checks above and the insert.
    async fn missing_reference(&self, input: &NewComment, user_id: Uuid) -> DomainError {
        match self.posts.find_by_id(input.post_id).await {
            Ok(None) => return DomainError::not_found("post", input.post_id),
            Err(e) => return e.into(),
            Ok(Some(_)) => {}
        }
        if let Some(parent_id) = input.parent_id {
            match self.comments.find_by_id(parent_id).await {
                Ok(None) => return DomainError::validation("parent comment does not exist"),
                Err(e) => return e.into(),
                Ok(Some(_)) => {}
            }
        }
        DomainError::not_found("user", user_id)
    }

    async fn ensure_post_visible(
        &self,
        viewer: &Viewer,
        post_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        match self.posts.find_by_id(post_id).await? {
            Some(post) if post.is_public_at(now) || viewer.is_admin => Ok(()),
            _ => Err(DomainError::not_found("post", post_id)),
        }
    }
}
