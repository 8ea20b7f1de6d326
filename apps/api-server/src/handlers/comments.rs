//! Comment handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use quill_core::domain::NewComment;
use quill_core::ports::RateLimiter;
use quill_shared::ApiResponse;
use quill_shared::dto::CreateCommentRequest;

use super::mapping::{comment_response, thread_response};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/posts/{post_id}/comments
pub async fn threads(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let threads = state
        .comments
        .threads(&identity.viewer(), post_id.into_inner(), Utc::now())
        .await?;

    let threads: Vec<_> = threads.into_iter().map(thread_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(threads)))
}

/// POST /api/posts/{post_id}/comments
///
/// Throttled per user.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let limit = state
        .comment_limiter
        .check(&identity.user_id.to_string())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !limit.allowed {
        tracing::warn!(user_id = %identity.user_id, "Comment rate limit exceeded");
        return Err(AppError::TooManyRequests(limit.reset_after.as_secs().max(1)));
    }

    let req = body.into_inner();
    let input = NewComment {
        post_id: post_id.into_inner(),
        parent_id: req.parent_id,
        content: req.content,
    };

    let comment = state
        .comments
        .create(&identity.viewer(), input, Utc::now())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        comment_response(comment),
        "Comment submitted and awaiting moderation",
    )))
}

/// DELETE /api/comments/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .comments
        .delete(&identity.viewer(), id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Comment deleted")))
}
