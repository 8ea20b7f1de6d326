//! Services - the blog operations, built over the repository ports.
//!
//! Every operation takes the caller as an explicit [`Viewer`](crate::Viewer)
//! and, where visibility depends on it, the current time.

mod comments;
mod posts;

pub use comments::CommentService;
pub use posts::PostService;
