//! # Quill Shared
//!
//! Wire types of the HTTP API, shared between the server and its clients.
//! Deliberately free of domain and infrastructure dependencies.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, Paginated};
