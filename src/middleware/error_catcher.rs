use crate::utils::{ApiError, ErrorResponse};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::Method,
    Error, HttpResponse,
};
use futures::future::{FutureExt, LocalBoxFuture};
use std::any::Any;
use std::fmt;
use std::future::{ready, Ready};
use std::panic::AssertUnwindSafe;

pub const UNHANDLED_MESSAGE: &str = "Something went wrong!";

/// Turns any error that is not an [`ApiError`] into a generic 500.
///
/// `ApiError`s already render their own response and pass through untouched.
/// Panics unwinding out of a handler are caught and answered the same way
/// (only in builds that unwind; the release profile aborts).
pub struct ErrorCatcher;

impl<S, B> Transform<S, ServiceRequest> for ErrorCatcher
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorCatcherMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorCatcherMiddleware { service }))
    }
}

pub struct ErrorCatcherMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for ErrorCatcherMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().clone();
        let url = req.uri().to_string();
        let fut = self.service.call(req);

        Box::pin(async move {
            let res = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(res)) => res,
                Ok(Err(err)) => {
                    log_unhandled(&err, &err, &method, &url);
                    return Err(InternalError::from_response(err, something_went_wrong()).into());
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref()).to_string();
                    log_unhandled(&message, &"handler panicked", &method, &url);
                    // No request survives the unwind, so the 500 travels as an error.
                    return Err(InternalError::from_response(message, something_went_wrong()).into());
                }
            };

            let unhandled = match res.response().error() {
                Some(err) if err.as_error::<ApiError>().is_none() => {
                    log_unhandled(err, err, &method, &url);
                    true
                }
                _ => false,
            };

            if unhandled {
                let (req, _) = res.into_parts();
                return Ok(ServiceResponse::new(req, something_went_wrong()).map_into_right_body());
            }

            Ok(res.map_into_left_body())
        })
    }
}

fn something_went_wrong() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse::new(UNHANDLED_MESSAGE))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("panic")
}

fn log_unhandled(error: &dyn fmt::Display, context: &dyn fmt::Debug, method: &Method, url: &str) {
    log::error!(
        error:% = error,
        context:? = context,
        url:% = url,
        method:% = method;
        "💥 Unhandled error"
    );
}
