//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CommentRepository, PasswordService, PostRepository, RateLimiter, TokenService, UserRepository,
};
use quill_core::{CommentService, PostService};
use quill_infra::database::DatabaseConfig;
use quill_infra::{Argon2PasswordService, InMemoryRateLimiter, JwtTokenService, MemoryStore};

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use quill_infra::database::{
    PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: PostService,
    pub comments: CommentService,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub comment_limiter: Arc<dyn RateLimiter>,
}

/// The three repositories, backed by the same store.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.users()),
            posts: Arc::new(store.posts()),
            comments: Arc::new(store.comments()),
        }
    }

    #[cfg(feature = "postgres")]
    async fn connect(db_config: Option<&DatabaseConfig>) -> Self {
        let Some(config) = db_config else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        match DatabaseConnections::init(config).await {
            Ok(connections) => Self {
                users: Arc::new(PostgresUserRepository::new(connections.main.clone())),
                posts: Arc::new(PostgresPostRepository::new(connections.main.clone())),
                comments: Arc::new(PostgresCommentRepository::new(connections.main)),
            },
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect(_db_config: Option<&DatabaseConfig>) -> Self {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Self::in_memory()
    }
}

impl AppState {
    /// Build the application state with the configured backends.
    pub async fn new(config: &AppConfig) -> Self {
        let repositories = Repositories::connect(config.database.as_ref()).await;
        let state = Self::with_repositories(repositories, config);
        tracing::info!("Application state initialized");
        state
    }

    pub fn with_repositories(repositories: Repositories, config: &AppConfig) -> Self {
        let Repositories {
            users,
            posts,
            comments,
        } = repositories;

        Self {
            users,
            posts: PostService::new(posts.clone()),
            comments: CommentService::new(posts, comments),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            comment_limiter: Arc::new(InMemoryRateLimiter::new(
                config.comment_rate_limit.clone(),
            )),
        }
    }
}
