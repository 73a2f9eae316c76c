//! Driven port resolving API tokens to users.
//!
//! The token itself is issued and stored by the authentication subsystem
//! (a profile row per user). This port only looks tokens up.

use async_trait::async_trait;

use crate::domain::{ApiToken, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token lookup adapters.
    pub enum TokenAuthenticatorError {
        /// The credential store could not be reached.
        Connection { message: String } =>
            "token store connection failed: {message}",
        /// The lookup query failed.
        Query { message: String } =>
            "token lookup failed: {message}",
    }
}

/// Port for resolving an API token to the user that owns it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenAuthenticator: Send + Sync {
    /// Return the user owning `token`, or `None` when no profile carries it.
    async fn resolve(&self, token: &ApiToken) -> Result<Option<User>, TokenAuthenticatorError>;
}
