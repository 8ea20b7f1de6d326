//! Authentication extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::Future;
use std::pin::Pin;

use quill_core::Viewer;
use quill_core::ports::{AuthError, BaseRepository, TokenClaims, TokenService};

use super::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub roles: Vec<String>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == "admin")
    }

    /// The caller as the services see it.
    pub fn viewer(&self) -> Viewer {
        if self.is_admin() {
            Viewer::admin(self.user_id)
        } else {
            Viewer::user(self.user_id)
        }
    }
}

fn bearer_claims(req: &HttpRequest) -> Result<(web::Data<AppState>, TokenClaims), AuthError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| {
            tracing::error!("AppState not found in app data");
            AuthError::InvalidToken("Server configuration error".to_string())
        })?;

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let token = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    let claims = state.tokens.validate_token(token)?;
    Ok((state, claims))
}

/// Resolve the token's account. Roles come from the stored account, not the
/// token claims.
async fn authenticate(state: web::Data<AppState>, claims: TokenClaims) -> AppResult<Identity> {
    let user = state.users.find_by_id(claims.user_id).await?.ok_or_else(|| {
        tracing::debug!(user_id = %claims.user_id, "Token for an account that no longer exists");
        AppError::Unauthorized
    })?;

    Ok(Identity {
        user_id: user.id,
        roles: user.roles(),
        email: user.email,
    })
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let bearer = bearer_claims(req);
        Box::pin(async move {
            let (state, claims) = bearer.map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AppError::from(e)
            })?;
            authenticate(state, claims).await
        })
    }
}

/// Optional identity extractor - anonymous when no valid token is present.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn viewer(&self) -> Viewer {
        self.0.as_ref().map(Identity::viewer).unwrap_or_default()
    }
}

impl FromRequest for OptionalIdentity {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let bearer = bearer_claims(req).ok();
        Box::pin(async move {
            let identity = match bearer {
                Some((state, claims)) => match authenticate(state, claims).await {
                    Ok(identity) => Some(identity),
                    Err(AppError::Unauthorized) => None,
                    Err(e) => return Err(e),
                },
                None => None,
            };
            Ok(OptionalIdentity(identity))
        })
    }
}
