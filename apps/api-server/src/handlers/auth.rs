//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::DomainError;
use quill_core::domain::User;
use quill_core::ports::{
    AuthError, BaseRepository, PasswordService, TokenService, UserRepository,
};
use quill_shared::ApiResponse;
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest};

use super::mapping::user_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

fn validate_registration(req: &RegisterUserRequest) -> AppResult<()> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if !req.email.contains('@') {
        errors.push("email must be a valid address".to_string());
    }
    if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn issue_token(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.email, user.roles())?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_registration(&req)?;

    let email = req.email.trim().to_lowercase();
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = User::new(req.name.trim().to_string(), email, password_hash);
    let saved = state.users.save(user).await?;
    tracing::info!(user_id = %saved.id, "User registered");

    Ok(HttpResponse::Created().json(ApiResponse::ok(issue_token(&state, &saved)?)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_email(&req.email.trim().to_lowercase())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Rejected login");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(issue_token(&state, &user)?)))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("user", identity.user_id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(user))))
}
