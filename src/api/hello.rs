use crate::app::AppContext;
use actix_web::{web, HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const GREETING: &str = "Hello World!";

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HelloResponse {
    pub message: String,
    pub timestamp: String,
    pub environment: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Hello",
    responses(
        (status = 200, description = "Greeting", body = HelloResponse)
    )
)]
pub async fn hello_world(ctx: web::Data<AppContext>) -> impl Responder {
    log::info!("👋 Hello World endpoint accessed");

    HttpResponse::Ok().json(HelloResponse {
        message: GREETING.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        environment: ctx.environment().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{build_app, testing::memory_context};
    use actix_web::{http::StatusCode, test};

    #[actix_web::test]
    async fn greets_with_environment_label() {
        let (ctx, _) = memory_context();
        let app = test::init_service(build_app(ctx)).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: HelloResponse = test::read_body_json(res).await;
        assert_eq!(body.message, "Hello World!");
        assert_eq!(body.environment, "test");
        assert!(chrono::DateTime::parse_from_rfc3339(&body.timestamp).is_ok());
    }

    #[actix_web::test]
    async fn ignores_query_and_body() {
        let (ctx, _) = memory_context();
        let app = test::init_service(build_app(ctx)).await;

        let req = test::TestRequest::get()
            .uri("/?name=ignored")
            .set_payload("not json at all")
            .to_request();
        let body: HelloResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.message, "Hello World!");
    }
}
