//! Demo data for a freshly migrated database.
//!
//! Creates an administrator (from `SEED_ADMIN_EMAIL` / `SEED_ADMIN_PASSWORD`),
//! an author, posts in each visibility state and a moderated comment thread.
//! Does nothing when the administrator already exists.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};

use quill_core::domain::{NewComment, NewPost, User};
use quill_core::ports::{BaseRepository, PasswordService, UserRepository};
use quill_core::{CommentService, PostService, Viewer};
use quill_infra::Argon2PasswordService;
use quill_infra::DatabaseConnections;
use quill_infra::database::{
    DatabaseConfig, PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .init();

    let config = DatabaseConfig {
        url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
        max_connections: 5,
        min_connections: 1,
    };
    let admin_email =
        env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let admin_password = env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| {
        tracing::warn!("SEED_ADMIN_PASSWORD not set, using the default demo password");
        "change-me-please".to_string()
    });

    let db = DatabaseConnections::init(&config)
        .await
        .context("failed to connect to the database")?;
    let users = PostgresUserRepository::new(db.main.clone());
    let posts = Arc::new(PostgresPostRepository::new(db.main.clone()));
    let comments = Arc::new(PostgresCommentRepository::new(db.main));
    let passwords = Argon2PasswordService::new();

    if users.find_by_email(&admin_email).await?.is_some() {
        tracing::info!(email = %admin_email, "Administrator exists, nothing to seed");
        return Ok(());
    }

    let now = Utc::now();
    let admin = users
        .save(
            User::new(
                "Administrator".to_string(),
                admin_email,
                passwords.hash(&admin_password)?,
            )
            .into_admin()
            .verified_at(now),
        )
        .await?;
    let author = users
        .save(User::new(
            "Demo Author".to_string(),
            "author@example.com".to_string(),
            passwords.hash("author-password")?,
        ))
        .await?;
    tracing::info!(admin = %admin.id, author = %author.id, "Users created");

    let post_service = PostService::new(posts.clone());
    let comment_service = CommentService::new(posts, comments);
    let author_viewer = Viewer::user(author.id);
    let admin_viewer = Viewer::admin(admin.id);

    let welcome = post_service
        .create(
            &author_viewer,
            NewPost {
                title: "Welcome to Quill".to_string(),
                excerpt: Some("A first look around.".to_string()),
                content: "Posts, comments and replies, all moderated.".to_string(),
                is_published: true,
                published_at: Some(now - Duration::days(1)),
                ..Default::default()
            },
            now,
        )
        .await?;
    post_service
        .create(
            &author_viewer,
            NewPost {
                title: "Coming Next Week".to_string(),
                content: "Scheduled, invisible until its publish time.".to_string(),
                is_published: true,
                published_at: Some(now + Duration::days(7)),
                ..Default::default()
            },
            now,
        )
        .await?;
    post_service
        .create(
            &author_viewer,
            NewPost {
                title: "Unfinished Thoughts".to_string(),
                content: "A draft only its author can list.".to_string(),
                ..Default::default()
            },
            now,
        )
        .await?;

    let question = comment_service
        .create(
            &admin_viewer,
            NewComment {
                post_id: welcome.id,
                parent_id: None,
                content: "Great to see this live!".to_string(),
            },
            now,
        )
        .await?;
    let answer = comment_service
        .create(
            &author_viewer,
            NewComment {
                post_id: welcome.id,
                parent_id: Some(question.id),
                content: "Thanks, more posts are on the way.".to_string(),
            },
            now,
        )
        .await?;
    comment_service
        .create(
            &author_viewer,
            NewComment {
                post_id: welcome.id,
                parent_id: None,
                content: "This one is still waiting for moderation.".to_string(),
            },
            now,
        )
        .await?;

    for id in [question.id, answer.id] {
        comment_service.toggle_approval(&admin_viewer, id, now).await?;
    }

    tracing::info!("Seeding complete");
    Ok(())
}
