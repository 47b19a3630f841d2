use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::USER_AGENT,
    Error,
};
use chrono::{SecondsFormat, Utc};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

/// Logs every incoming request before anything else handles it.
/// Never short-circuits.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Socket peer only; forwarding headers are not trusted
        let ip = req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "-".to_string());
        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");

        log::info!(
            method:% = req.method(),
            url:% = req.uri(),
            ip:% = ip,
            user_agent:% = user_agent,
            timestamp:% = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            "📥 Incoming request"
        );

        let fut = self.service.call(req);
        Box::pin(fut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::logger::capture;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    #[actix_web::test]
    async fn passes_requests_through() {
        let app = test::init_service(
            App::new()
                .wrap(RequestLogger)
                .route("/", web::get().to(HttpResponse::Accepted)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((USER_AGENT, "rstest"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::ACCEPTED);
    }

    #[actix_web::test]
    async fn logs_method_url_peer_and_user_agent() {
        capture::install();
        let app = test::init_service(
            App::new()
                .wrap(RequestLogger)
                .route("/logged", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/logged?page=2")
            .peer_addr("10.1.2.3:4567".parse().unwrap())
            .insert_header((USER_AGENT, "request-logger-fields/1.0"))
            .insert_header(("x-forwarded-for", "203.0.113.9"))
            .to_request();
        test::call_service(&app, req).await;

        let records = capture::records_with("user_agent", "request-logger-fields/1.0");
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.level, log::Level::Info);
        assert_eq!(record.message, "📥 Incoming request");
        assert_eq!(record.field("method"), Some("GET"));
        assert_eq!(record.field("url"), Some("/logged?page=2"));
        assert_eq!(record.field("ip"), Some("10.1.2.3"));

        let timestamp = record.field("timestamp").unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert!(timestamp.ends_with('Z'));
    }

    #[actix_web::test]
    async fn unknown_peer_and_agent_log_as_dash() {
        capture::install();
        let app = test::init_service(
            App::new()
                .wrap(RequestLogger)
                .route("/anonymous-visit", web::post().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::post().uri("/anonymous-visit").to_request();
        test::call_service(&app, req).await;

        let records = capture::records_with("url", "/anonymous-visit");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field("method"), Some("POST"));
        assert_eq!(records[0].field("ip"), Some("-"));
        assert_eq!(records[0].field("user_agent"), Some("-"));
    }
}
