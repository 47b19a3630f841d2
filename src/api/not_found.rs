use crate::utils::ErrorResponse;
use actix_web::{HttpRequest, HttpResponse};

pub async fn route_not_found(req: HttpRequest) -> HttpResponse {
    log::warn!(url:% = req.uri(), method:% = req.method(); "🔍 404 - Route not found");

    HttpResponse::NotFound().json(ErrorResponse::new("Route not found"))
}
