//! Poll comments backend library.
//!
//! Hexagonal layout: [`domain`] holds the comment core and its ports,
//! [`inbound`] the actix-web adapter, and [`outbound`] the in-memory and
//! PostgreSQL adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
