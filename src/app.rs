use crate::{
    api,
    database::{ConnectionStatus, ConnectionState},
    middleware,
    services::UserStore,
};
use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything a handler may touch, built once in `main` and shared through
/// `web::Data`.
pub struct AppContext {
    users: Arc<dyn UserStore>,
    connection: Arc<dyn ConnectionStatus>,
    environment: String,
    started_at: Instant,
}

impl AppContext {
    pub fn new(
        users: Arc<dyn UserStore>,
        connection: Arc<dyn ConnectionStatus>,
        environment: impl Into<String>,
        started_at: Instant,
    ) -> Self {
        Self {
            users,
            connection,
            environment: environment.into(),
            started_at,
        }
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.current_state()
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// The full application: interceptors, routes and the not-found fallback.
///
/// `wrap` makes the last registered middleware the outermost one, so the
/// request logger sees the request first and CORS sits next to the router.
pub fn build_app(
    ctx: web::Data<AppContext>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(ctx)
        .wrap(Cors::permissive())
        .wrap(middleware::ErrorCatcher)
        .wrap(middleware::SecurityHeaders)
        .wrap(middleware::RequestLogger)
        .configure(api::configure)
        .default_service(web::route().to(api::not_found::route_not_found))
}


#[cfg(test)]
mod tests {
    use super::testing::memory_context;
    use super::*;
    use actix_web::{http::StatusCode, test};

    fn assert_hardened<B>(res: &ServiceResponse<B>) {
        assert_eq!(res.headers().get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(res.headers().get("x-frame-options").unwrap(), "SAMEORIGIN");
        assert_eq!(
            res.headers().get("strict-transport-security").unwrap(),
            "max-age=15552000; includeSubDomains"
        );
    }

    #[actix_web::test]
    async fn not_found_responses_are_hardened() {
        let (ctx, _) = memory_context();
        let app = test::init_service(build_app(ctx)).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/missing").to_request()).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_hardened(&res);
    }

    #[actix_web::test]
    async fn unhandled_errors_are_hardened() {
        let (ctx, _) = memory_context();
        let app = test::init_service(build_app(ctx)).await;

        let req = test::TestRequest::post()
            .uri("/users")
            .insert_header(("content-type", "application/json"))
            .set_payload("{oops")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_hardened(&res);
    }

    #[actix_web::test]
    async fn handled_errors_are_hardened() {
        let (ctx, _) = memory_context();
        let app = test::init_service(build_app(ctx)).await;

        let req = test::TestRequest::post().uri("/users").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_hardened(&res);
    }
}
