use crate::{app::AppContext, database::ConnectionState};
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Seconds since the process started.
    pub uptime: f64,
    /// `connected` or `disconnected`.
    pub mongodb: String,
}

/// Liveness only: answers 200 whatever the database state.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check(ctx: web::Data<AppContext>) -> impl Responder {
    log::info!("🩺 Health check endpoint accessed");

    let mongodb = match ctx.connection_state() {
        ConnectionState::Connected => "connected",
        _ => "disconnected",
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "OK".to_string(),
        uptime: ctx.uptime().as_secs_f64(),
        mongodb: mongodb.to_string(),
    })
}
