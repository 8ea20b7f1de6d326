//! Post handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use quill_core::domain::{NewPost, PostChanges};
use quill_shared::ApiResponse;
use quill_shared::dto::{CreatePostRequest, PageQuery, UpdatePostRequest};

use super::mapping::{paginated, post_response};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts?page=N
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .list_public(query.page.unwrap_or(1), Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(paginated(page, post_response))))
}

/// GET /api/posts/mine
pub async fn mine(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let posts = state.posts.list_mine(&identity.viewer()).await?;
    let posts: Vec<_> = posts.into_iter().map(post_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/posts/{slug}
pub async fn show(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_visible(&identity.viewer(), &slug, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = NewPost {
        title: req.title,
        slug: req.slug,
        excerpt: req.excerpt,
        content: req.content,
        featured_image: req.featured_image,
        is_published: req.is_published,
        published_at: req.published_at,
    };

    let post = state
        .posts
        .create(&identity.viewer(), input, Utc::now())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(post))))
}

/// PUT /api/posts/{slug}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        slug: req.slug,
        excerpt: req.excerpt,
        content: req.content,
        featured_image: req.featured_image,
        is_published: req.is_published,
        published_at: req.published_at,
    };

    let post = state
        .posts
        .update(&identity.viewer(), &slug, changes, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// DELETE /api/posts/{slug}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.posts.delete(&identity.viewer(), &slug).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted")))
}
