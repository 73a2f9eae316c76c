//! HTTP inbound adapter exposing the comment endpoints.

pub mod auth;
pub mod comments;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub(crate) mod validation;

pub use error::ApiResult;
