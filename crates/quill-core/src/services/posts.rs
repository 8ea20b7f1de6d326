use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewPost, POSTS_PER_PAGE, Page, PageRequest, Post, PostChanges, Viewer};
use crate::error::{DomainError, RepoError};
use crate::ports::{BaseRepository, PostRepository};

/// Post publishing and management.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// One page of the public listing, most recently published first.
    pub async fn list_public(&self, page: u64, now: DateTime<Utc>) -> Result<Page<Post>, DomainError> {
        let request = PageRequest::new(page, POSTS_PER_PAGE);
        Ok(self.posts.list_published(now, request).await?)
    }

    /// Post detail. Non-public posts are hidden from everyone but administrators.
    pub async fn find_visible(
        &self,
        viewer: &Viewer,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("post", slug))?;

        if post.is_public_at(now) || viewer.is_admin {
            Ok(post)
        } else {
            tracing::debug!(%slug, "Hiding non-public post");
            Err(DomainError::not_found("post", slug))
        }
    }

    /// All posts of the caller, drafts included.
    pub async fn list_mine(&self, viewer: &Viewer) -> Result<Vec<Post>, DomainError> {
        let user_id = viewer.require_user()?;
        Ok(self.posts.find_by_user_id(user_id).await?)
    }

    pub async fn create(
        &self,
        viewer: &Viewer,
        input: NewPost,
        now: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        let user_id = viewer.require_user()?;
        let post = Post::create(user_id, input, now)?;
        let slug = post.slug.clone();

        let saved = self
            .posts
            .save(post)
            .await
            .map_err(|e| save_error(e, &slug, user_id))?;
        tracing::info!(post_id = %saved.id, slug = %saved.slug, "Post created");
        Ok(saved)
    }

    pub async fn update(
        &self,
        viewer: &Viewer,
        slug: &str,
        changes: PostChanges,
        now: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        let mut post = self.find_managed(viewer, slug).await?;
        post.apply(changes, now)?;
        let new_slug = post.slug.clone();
        let owner = post.user_id;

        let saved = self
            .posts
            .save(post)
            .await
            .map_err(|e| save_error(e, &new_slug, owner))?;
        tracing::info!(post_id = %saved.id, slug = %saved.slug, "Post updated");
        Ok(saved)
    }

    /// Delete a post together with all of its comments.
    pub async fn delete(&self, viewer: &Viewer, slug: &str) -> Result<(), DomainError> {
        let post = self.find_managed(viewer, slug).await?;
        self.posts.delete(post.id).await?;
        tracing::info!(post_id = %post.id, "Post deleted");
        Ok(())
    }

    async fn find_managed(&self, viewer: &Viewer, slug: &str) -> Result<Post, DomainError> {
        viewer.require_user()?;
        let post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("post", slug))?;
        viewer.ensure_can_manage(post.user_id, "post")?;
        Ok(post)
    }
}

/// A taken slug is a conflict; a missing owner row means the account is gone.
fn save_error(err: RepoError, slug: &str, owner: Uuid) -> DomainError {
    match err {
        RepoError::UniqueViolation(_) => {
            DomainError::Duplicate(format!("a post with slug '{slug}' already exists"))
        }
        RepoError::ForeignKey(_) => DomainError::not_found("user", owner),
        other => other.into(),
    }
}
