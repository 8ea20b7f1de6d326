use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::slugify;
use crate::error::DomainError;

const MAX_TITLE_LENGTH: usize = 255;
const MAX_SLUG_LENGTH: usize = 255;
const MAX_EXCERPT_LENGTH: usize = 500;

/// Post entity - a blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub featured_image: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    /// Explicit slug; derived from the title when absent.
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub featured_image: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
}

/// Partial update of a post. `None` leaves a field untouched; for the
/// optional columns `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub content: Option<String>,
    pub featured_image: Option<Option<String>>,
    pub is_published: Option<bool>,
    pub published_at: Option<Option<DateTime<Utc>>>,
}

impl Post {
    /// Validate the input and build a post owned by `user_id`.
    pub fn create(user_id: Uuid, input: NewPost, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let title = validate_title(&input.title)?;
        let slug = match input.slug.as_deref() {
            Some(explicit) => normalize_slug(explicit)?,
            None => derive_slug(&title)?,
        };
        let content = validate_content(&input.content)?;
        let excerpt = validate_excerpt(input.excerpt)?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            slug,
            excerpt,
            content,
            featured_image: non_blank(input.featured_image),
            is_published: input.is_published,
            published_at: input.published_at,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update. A new title regenerates the slug only while
    /// the slug is still the one derived from the title; a slug set
    /// explicitly, at creation or in an earlier or the same update, is kept.
    pub fn apply(&mut self, changes: PostChanges, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(title) = changes.title {
            let derived = self.has_derived_slug();
            self.title = validate_title(&title)?;
            if derived && changes.slug.is_none() {
                self.slug = derive_slug(&self.title)?;
            }
        }
        if let Some(slug) = changes.slug {
            self.slug = normalize_slug(&slug)?;
        }
        if let Some(excerpt) = changes.excerpt {
            self.excerpt = validate_excerpt(excerpt)?;
        }
        if let Some(content) = changes.content {
            self.content = validate_content(&content)?;
        }
        if let Some(featured_image) = changes.featured_image {
            self.featured_image = non_blank(featured_image);
        }
        if let Some(is_published) = changes.is_published {
            self.is_published = is_published;
        }
        if let Some(published_at) = changes.published_at {
            self.published_at = published_at;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Whether the post belongs to the public surface at `now`.
    pub fn is_public_at(&self, now: DateTime<Utc>) -> bool {
        self.is_published && self.published_at.is_some_and(|at| at <= now)
    }
}

fn validate_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::validation("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(DomainError::validation(format!(
            "title may not exceed {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(title.to_string())
}

impl Post {
    fn has_derived_slug(&self) -> bool {
        derive_slug(&self.title).is_ok_and(|slug| slug == self.slug)
    }
}

fn derive_slug(title: &str) -> Result<String, DomainError> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(DomainError::validation(
            "title must contain at least one letter or digit",
        ));
    }
    Ok(truncate_slug(slug))
}

fn normalize_slug(explicit: &str) -> Result<String, DomainError> {
    let slug = slugify(explicit);
    if slug.is_empty() {
        return Err(DomainError::validation(
            "slug must contain at least one letter or digit",
        ));
    }
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(DomainError::validation(format!(
            "slug may not exceed {MAX_SLUG_LENGTH} characters"
        )));
    }
    Ok(slug)
}

// Slugs are ASCII, so byte truncation is safe.
fn truncate_slug(mut slug: String) -> String {
    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

fn validate_content(content: &str) -> Result<String, DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::validation("content is required"));
    }
    Ok(content.to_string())
}

fn validate_excerpt(excerpt: Option<String>) -> Result<Option<String>, DomainError> {
    let excerpt = non_blank(excerpt);
    if let Some(text) = &excerpt {
        if text.chars().count() > MAX_EXCERPT_LENGTH {
            return Err(DomainError::validation(format!(
                "excerpt may not exceed {MAX_EXCERPT_LENGTH} characters"
            )));
        }
    }
    Ok(excerpt)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
