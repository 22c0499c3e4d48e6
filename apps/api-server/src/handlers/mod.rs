//! HTTP handlers and route configuration.

mod health;
mod users;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/users")
                    .route("", web::get().to(users::list_users))
                    .route("", web::post().to(users::create_user))
                    .route(
                        "/by-username/{username}",
                        web::get().to(users::get_user_by_username),
                    )
                    .route("/{id}", web::get().to(users::get_user))
                    .route("/{id}", web::delete().to(users::delete_user))
                    .route("/{id}/password", web::put().to(users::reset_password)),
            ),
    );
}
