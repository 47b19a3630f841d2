use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hello Service API",
        version = "1.0.0",
        description = "Hello world, health check and a minimal user registry backed by MongoDB."
    ),
    paths(
        crate::api::hello::hello_world,
        crate::api::health::health_check,
        crate::api::users::create_user,
        crate::api::users::list_users,
    ),
    components(
        schemas(
            crate::api::hello::HelloResponse,
            crate::api::health::HealthResponse,
            crate::models::CreateUserRequest,
            crate::models::UserResponse,
            crate::utils::ErrorResponse,
        )
    ),
    tags(
        (name = "Hello", description = "Greeting endpoint."),
        (name = "Health", description = "Liveness check reporting uptime and MongoDB connection state."),
        (name = "Users", description = "Create and list users. Emails are unique."),
    )
)]
pub struct ApiDoc;
