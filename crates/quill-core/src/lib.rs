//! # Quill Core
//!
//! The domain layer of the Quill blog backend.
//! This crate contains entities, the publish and moderation rules, the ports
//! infrastructure must implement, and the services built on top of them.
//! It has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use domain::Viewer;
pub use error::{DomainError, RepoError};
pub use services::{CommentService, PostService};
