//! Domain entities - the core business objects.

mod comment;
mod page;
mod post;
mod slug;
mod user;
mod viewer;

pub use comment::{
    Comment, CommentThread, MAX_COMMENT_LENGTH, NewComment, build_threads, validate_comment_content,
};
pub use page::{MODERATION_PER_PAGE, POSTS_PER_PAGE, Page, PageRequest};
pub use post::{NewPost, Post, PostChanges};
pub use slug::slugify;
pub use user::User;
pub use viewer::Viewer;
