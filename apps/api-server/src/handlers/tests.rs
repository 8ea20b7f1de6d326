use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::sync::Arc;

use quill_core::Viewer;
use quill_core::domain::{NewPost, User};
use quill_core::ports::{BaseRepository, TokenService, UserRepository};
use uuid::Uuid;

use super::configure_routes;
use crate::config::AppConfig;
use crate::state::{AppState, Repositories};

struct Fixture {
    state: AppState,
    users: Arc<dyn UserRepository>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    fn with_config(config: AppConfig) -> Self {
        let repositories = Repositories::in_memory();
        let users = repositories.users.clone();
        Self {
            state: AppState::with_repositories(repositories, &config),
            users,
        }
    }

    /// Store a user directly and return a bearer header for them.
    async fn user(&self, name: &str, admin: bool) -> (User, String) {
        let mut user = User::new(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            "unused-hash".to_string(),
        );
        if admin {
            user = user.into_admin();
        }
        let user = self.users.save(user).await.unwrap();
        let token = self
            .state
            .tokens
            .generate_token(user.id, &user.email, user.roles())
            .unwrap();
        (user, format!("Bearer {token}"))
    }
}

macro_rules! app {
    ($fixture:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($fixture.state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_rt::test]
async fn health_is_public() {
    let fixture = Fixture::new();
    let app = app!(fixture);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn register_login_and_profile() {
    let fixture = Fixture::new();
    let app = app!(fixture);
    let account = json!({"name": "Ada", "email": "Ada@Example.com", "password": "correct horse"});

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&account)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&account)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "ada@example.com", "password": "wrong password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "ada@example.com", "password": "correct horse"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["name"], "Ada");
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["is_admin"], false);
}

#[actix_rt::test]
async fn register_reports_every_invalid_field() {
    let fixture = Fixture::new();
    let app = app!(fixture);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"name": " ", "email": "nope", "password": "short"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
}

#[actix_rt::test]
async fn me_requires_a_token() {
    let fixture = Fixture::new();
    let app = app!(fixture);

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn comment_waits_for_moderation() {
    let fixture = Fixture::new();
    let (_, admin) = fixture.user("Admin", true).await;
    let (_, reader) = fixture.user("Reader", false).await;
    let app = app!(fixture);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", admin.clone()))
        .set_json(json!({
            "title": "Hello World",
            "content": "First post",
            "is_published": true,
            "published_at": Utc::now() - Duration::hours(1),
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["slug"], "hello-world");
    let post_id = body["data"]["id"].as_str().unwrap().to_string();
    let comments_uri = format!("/api/posts/{post_id}/comments");

    let req = test::TestRequest::post()
        .uri(&comments_uri)
        .insert_header(("Authorization", reader.clone()))
        .set_json(json!({"content": "  Nice post!  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["content"], "Nice post!");
    assert_eq!(body["data"]["is_approved"], false);
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get().uri(&comments_uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri(&comments_uri)
        .insert_header(("Authorization", reader.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/comments/{comment_id}/approval"))
        .insert_header(("Authorization", admin.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["is_approved"], true);

    let req = test::TestRequest::get().uri(&comments_uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let threads = body["data"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["id"], comment_id.as_str());
    assert!(threads[0]["replies"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn scheduled_post_is_hidden_from_guests() {
    let fixture = Fixture::new();
    let (_, admin) = fixture.user("Admin", true).await;
    let (_, author) = fixture.user("Author", false).await;
    let app = app!(fixture);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", author.clone()))
        .set_json(json!({
            "title": "Coming Soon",
            "content": "Tomorrow",
            "is_published": true,
            "published_at": Utc::now() + Duration::days(1),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/posts/coming-soon").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/posts/coming-soon")
        .insert_header(("Authorization", admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/posts?page=1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 0);

    let req = test::TestRequest::get()
        .uri("/api/posts/mine")
        .insert_header(("Authorization", author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"][0]["slug"], "coming-soon");
}

#[actix_rt::test]
async fn only_the_author_may_edit_a_post() {
    let fixture = Fixture::new();
    let (_, author) = fixture.user("Author", false).await;
    let (_, other) = fixture.user("Other", false).await;
    let app = app!(fixture);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", author.clone()))
        .set_json(json!({"title": "Draft", "content": "Body"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::put()
        .uri("/api/posts/draft")
        .insert_header(("Authorization", other))
        .set_json(json!({"title": "Hijacked"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/api/posts/draft")
        .insert_header(("Authorization", author.clone()))
        .set_json(json!({"title": "Final Title", "excerpt": null}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["slug"], "final-title");

    let req = test::TestRequest::delete()
        .uri("/api/posts/final-title")
        .insert_header(("Authorization", author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn moderation_listing_requires_admin() {
    let fixture = Fixture::new();
    let (_, admin) = fixture.user("Admin", true).await;
    let (_, reader) = fixture.user("Reader", false).await;
    let app = app!(fixture);

    let req = test::TestRequest::get().uri("/api/admin/comments").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/admin/comments")
        .insert_header(("Authorization", reader))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/admin/comments?page=0")
        .insert_header(("Authorization", admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["per_page"], 20);
    assert_eq!(body["data"]["total"], 0);
}

async fn published_post_id(fixture: &Fixture, author: &User) -> Uuid {
    let input = NewPost {
        title: "Open Thread".to_string(),
        content: "Say hi".to_string(),
        is_published: true,
        published_at: Some(Utc::now() - Duration::minutes(5)),
        ..Default::default()
    };
    let post = fixture
        .state
        .posts
        .create(&Viewer::user(author.id), input, Utc::now())
        .await
        .unwrap();
    post.id
}

#[actix_rt::test]
async fn overlong_comment_is_rejected() {
    let fixture = Fixture::new();
    let (user, reader) = fixture.user("Reader", false).await;
    let post_id = published_post_id(&fixture, &user).await;
    let app = app!(fixture);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{post_id}/comments"))
        .insert_header(("Authorization", reader))
        .set_json(json!({"content": "x".repeat(1001)}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn comments_are_throttled_per_user() {
    let mut config = AppConfig::default();
    config.comment_rate_limit.per_minute = 1;
    let fixture = Fixture::with_config(config);
    let (user, reader) = fixture.user("Reader", false).await;
    let post_id = published_post_id(&fixture, &user).await;
    let app = app!(fixture);
    let uri = format!("/api/posts/{post_id}/comments");

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(("Authorization", reader.clone()))
        .set_json(json!({"content": "first"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(("Authorization", reader))
        .set_json(json!({"content": "second"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("Retry-After"));
}

#[actix_rt::test]
async fn malformed_path_id_is_a_bad_request() {
    let fixture = Fixture::new();
    let app = app!(fixture);

    let req = test::TestRequest::get()
        .uri("/api/posts/not-a-uuid/comments")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn revoked_admin_loses_moderation_with_live_token() {
    let fixture = Fixture::new();
    let (admin, token) = fixture.user("Admin", true).await;
    let app = app!(fixture);

    let req = test::TestRequest::get()
        .uri("/api/admin/comments")
        .insert_header(("Authorization", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let mut demoted = admin;
    demoted.is_admin = false;
    fixture.users.save(demoted).await.unwrap();

    let req = test::TestRequest::get()
        .uri("/api/admin/comments")
        .insert_header(("Authorization", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn token_of_deleted_account_is_rejected() {
    let fixture = Fixture::new();
    let (user, token) = fixture.user("Leaver", false).await;
    let post_id = published_post_id(&fixture, &fixture.user("Author", false).await.0).await;
    fixture.users.delete(user.id).await.unwrap();
    let app = app!(fixture);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{post_id}/comments"))
        .insert_header(("Authorization", token.clone()))
        .set_json(json!({"content": "still here?"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}/comments"))
        .insert_header(("Authorization", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
