use chrono::{Duration, Utc};
use quill_core::domain::{Comment, Post};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CommentRepository, PostRepository};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
use uuid::Uuid;

use crate::database::entity::{comment, post};
use crate::database::postgres_base::map_db_err;
use crate::database::postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, mask_email,
};

fn post_model(slug: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        title: "Test Post".to_owned(),
        slug: slug.to_owned(),
        excerpt: None,
        content: "Content".to_owned(),
        featured_image: Some("covers/test.png".to_owned()),
        is_published: true,
        published_at: Some((now - Duration::days(1)).into()),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let model = post_model("test-post");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert!(post.is_public_at(Utc::now()));
}

#[tokio::test]
async fn test_find_post_by_slug_missing() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(repo.find_by_slug("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_comments_by_post_maps_parent() {
    let now = Utc::now();
    let post_id = Uuid::new_v4();
    let parent_id = Uuid::new_v4();
    let reply = comment::Model {
        id: Uuid::new_v4(),
        post_id,
        user_id: Uuid::new_v4(),
        parent_id: Some(parent_id),
        content: "A reply".to_owned(),
        is_approved: false,
        created_at: now.into(),
        updated_at: now.into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![reply]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let comments: Vec<Comment> = repo.find_by_post_id(post_id).await.unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].parent_id, Some(parent_id));
    assert!(!comments[0].is_approved);
}

#[tokio::test]
async fn test_delete_missing_comment_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let result = BaseRepository::<Comment, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[test]
fn test_mask_email() {
    assert_eq!(mask_email("alice@example.com"), "a***@example.com");
    assert_eq!(mask_email("a@example.com"), "***@example.com");
    assert_eq!(mask_email("not-an-email"), "***");
}

#[test]
fn test_map_db_err_separates_unique_from_foreign_key() {
    let unique = DbErr::Custom(
        "duplicate key value violates unique constraint \"posts_slug_key\"".to_string(),
    );
    assert!(matches!(map_db_err(unique), RepoError::UniqueViolation(_)));

    let foreign = DbErr::Custom(
        "insert or update on table \"comments\" violates foreign key constraint \"fk_comments_parent_id\""
            .to_string(),
    );
    assert!(matches!(map_db_err(foreign), RepoError::ForeignKey(_)));
}
