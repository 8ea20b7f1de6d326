//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod comments;
mod health;
mod mapping;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::{error, web};

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::BadRequest(err.to_string()))
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::BadRequest(err.to_string()))
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::BadRequest(err.to_string()))
    }))
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Posts; `/mine` must be registered before `/{slug}`
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/mine", web::get().to(posts::mine))
                    .route("/{post_id}/comments", web::get().to(comments::threads))
                    .route("/{post_id}/comments", web::post().to(comments::create))
                    .route("/{slug}", web::get().to(posts::show))
                    .route("/{slug}", web::put().to(posts::update))
                    .route("/{slug}", web::delete().to(posts::delete)),
            )
            .route("/comments/{id}", web::delete().to(comments::delete))
            // Moderation
            .service(
                web::scope("/admin")
                    .route("/comments", web::get().to(admin::comments))
                    .route(
                        "/comments/{id}/approval",
                        web::post().to(admin::toggle_approval),
                    ),
            ),
    );
}
