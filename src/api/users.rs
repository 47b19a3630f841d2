use crate::{
    app::AppContext,
    models::{CreateUserRequest, UserResponse},
    utils::{ApiError, ErrorResponse},
};
use actix_web::{error::JsonPayloadError, web, Error, HttpMessage, HttpRequest, HttpResponse};
use serde_json::Value;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Only `application/json` bodies are parsed. Anything else, and empty
/// bodies, read as `{}` so they fail validation, not parsing.
fn parse_body(content_type: &str, body: &[u8]) -> Result<Value, Error> {
    let is_json = content_type.eq_ignore_ascii_case(JSON_CONTENT_TYPE);

    if !is_json || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| JsonPayloadError::Deserialize(e).into())
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Name or email missing", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn create_user(
    ctx: web::Data<AppContext>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, Error> {
    // Parse body (malformed JSON escapes to the error catcher)
    let payload = parse_body(req.content_type(), &body)?;

    // Wrong shapes (arrays, numbers for name...) count as missing fields.
    let request: CreateUserRequest = serde_json::from_value(payload.clone()).unwrap_or_default();

    // Validate required fields
    let Some(new_user) = request.into_new_user() else {
        log::warn!(body:% = payload; "⚠️ Invalid user creation attempt");
        return Err(ApiError::MissingFields.into());
    };

    // Insert; the unique index rejects a reused email
    match ctx.users().create(new_user).await {
        Ok(user) => {
            log::info!(
                user_id:% = user.id,
                name:% = user.name,
                email:% = user.email;
                "✅ New user created"
            );
            Ok(HttpResponse::Created().json(UserResponse::from(user)))
        }
        Err(e) => {
            log::error!(error:% = e, body:% = payload; "❌ Error creating user");
            Err(ApiError::from(e).into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users, newest first", body = [UserResponse]),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_users(ctx: web::Data<AppContext>) -> Result<HttpResponse, ApiError> {
    match ctx.users().list_all().await {
        Ok(users) => {
            log::info!(count = users.len(); "📋 Users retrieved");
            let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
            Ok(HttpResponse::Ok().json(users))
        }
        Err(e) => {
            log::error!(error:% = e; "❌ Error retrieving users");
            Err(ApiError::from(e))
        }
    }
}
