use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::viewer::Viewer;
use crate::error::DomainError;

/// Maximum comment length, in characters.
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Comment entity - a top-level comment on a post or a reply to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    /// Set for replies; always points at a top-level comment of the same post.
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
}

/// A top-level comment together with its visible replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

impl Comment {
    /// New comments always start unapproved.
    pub fn new(
        post_id: Uuid,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        content: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            parent_id,
            content,
            is_approved: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn toggle_approval(&mut self, now: DateTime<Utc>) {
        self.is_approved = !self.is_approved;
        self.updated_at = now;
    }

    /// Approved comments are public; a pending one is visible to its author only.
    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        self.is_approved || viewer.is_owner(self.user_id)
    }
}

/// Check comment text and return it trimmed.
pub fn validate_comment_content(content: &str) -> Result<String, DomainError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("comment content cannot be empty"));
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(DomainError::validation(format!(
            "comment content exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Rebuild the two-level tree of one post's comments as `viewer` sees it.
///
/// Top-level comments and replies are each filtered on their own approval
/// state; a reply shows up only beneath a parent that is itself shown. Both
/// levels are ordered newest first.
pub fn build_threads(comments: Vec<Comment>, viewer: &Viewer) -> Vec<CommentThread> {
    let mut top_level = Vec::new();
    let mut replies: HashMap<Uuid, Vec<Comment>> = HashMap::new();

    for comment in comments.into_iter().filter(|c| c.is_visible_to(viewer)) {
        match comment.parent_id {
            Some(parent_id) => replies.entry(parent_id).or_default().push(comment),
            None => top_level.push(comment),
        }
    }

    sort_newest_first(&mut top_level);
    top_level
        .into_iter()
        .map(|comment| {
            let mut replies = replies.remove(&comment.id).unwrap_or_default();
            sort_newest_first(&mut replies);
            CommentThread { comment, replies }
        })
        .collect()
}

fn sort_newest_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
