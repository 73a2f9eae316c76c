//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects the comment and health endpoints together with the
//! schema wrappers from [`crate::inbound::http::schemas`]. Swagger UI serves
//! it in debug builds and `cargo run --bin openapi-dump` prints it.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, UserSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the API token header as a security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ApiToken",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Token",
                "Opaque API token stored on the user's profile.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Polls comments API",
        description = "Post and delete comments on published polls."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("ApiToken" = [])),
    paths(
        crate::inbound::http::comments::send_comment,
        crate::inbound::http::comments::delete_comment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(UserSchema, ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "comments", description = "Comment creation and deletion"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
