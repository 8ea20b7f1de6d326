//! Domain to DTO conversions.

use quill_core::domain::{Comment, CommentThread, Page, Post, User};
use quill_shared::Paginated;
use quill_shared::dto::{CommentResponse, CommentThreadResponse, PostResponse, UserResponse};

pub fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        is_admin: user.is_admin,
        email_verified_at: user.email_verified_at,
        created_at: user.created_at,
    }
}

pub fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        author_id: post.user_id,
        title: post.title,
        slug: post.slug,
        excerpt: post.excerpt,
        content: post.content,
        featured_image: post.featured_image,
        is_published: post.is_published,
        published_at: post.published_at,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author_id: comment.user_id,
        parent_id: comment.parent_id,
        content: comment.content,
        is_approved: comment.is_approved,
        created_at: comment.created_at,
    }
}

pub fn thread_response(thread: CommentThread) -> CommentThreadResponse {
    CommentThreadResponse {
        comment: comment_response(thread.comment),
        replies: thread.replies.into_iter().map(comment_response).collect(),
    }
}

pub fn paginated<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> Paginated<U> {
    let total_pages = page.total_pages();
    let page = page.map(f);
    Paginated {
        items: page.items,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        total_pages,
    }
}
