//! Moderation handlers. Administrators only.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use quill_shared::ApiResponse;
use quill_shared::dto::PageQuery;

use super::mapping::{comment_response, paginated};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/admin/comments?page=N
pub async fn comments(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .comments
        .moderation_queue(&identity.viewer(), query.page.unwrap_or(1))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(paginated(page, comment_response))))
}

/// POST /api/admin/comments/{id}/approval
pub async fn toggle_approval(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .toggle_approval(&identity.viewer(), id.into_inner(), Utc::now())
        .await?;

    let message = if comment.is_approved {
        "Comment approved"
    } else {
        "Comment unapproved"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        comment_response(comment),
        message,
    )))
}
