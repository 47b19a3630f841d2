pub mod health;
pub mod hello;
pub mod not_found;
pub mod swagger;
pub mod users;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Route table. An unmatched method on a known path answers 404 like an
/// unknown path does, not 405. A single trailing slash is accepted.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}")
            .url("/api-docs/openapi.json", swagger::ApiDoc::openapi()),
    )
    .service(
        web::resource("/")
            .route(web::get().to(hello::hello_world))
            .default_service(web::to(not_found::route_not_found)),
    )
    .service(
        web::resource(["/health", "/health/"])
            .route(web::get().to(health::health_check))
            .default_service(web::to(not_found::route_not_found)),
    )
    .service(
        web::resource(["/users", "/users/"])
            .route(web::get().to(users::list_users))
            .route(web::post().to(users::create_user))
            .default_service(web::to(not_found::route_not_found)),
    );
}
