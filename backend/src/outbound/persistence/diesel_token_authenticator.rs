//! PostgreSQL-backed `TokenAuthenticator` resolving tokens via `profiles`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{TokenAuthenticator, TokenAuthenticatorError};
use crate::domain::{ApiToken, User};

use super::diesel_helpers::{map_basic_diesel_error, map_pool_error};
use super::models::UserRow;
use super::pool::DbPool;
use super::row_mapping::user_from_row;
use super::schema::{profiles, users};

/// Diesel-backed token lookup joining `users` with `profiles`.
#[derive(Clone)]
pub struct DieselTokenAuthenticator {
    pool: DbPool,
}

impl DieselTokenAuthenticator {
    /// Create a new authenticator with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenAuthenticator for DieselTokenAuthenticator {
    async fn resolve(&self, token: &ApiToken) -> Result<Option<User>, TokenAuthenticatorError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TokenAuthenticatorError::connection))?;

        let row = users::table
            .inner_join(profiles::table)
            .filter(profiles::api_token.eq(token.expose()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                map_basic_diesel_error(
                    err,
                    "resolve token",
                    TokenAuthenticatorError::query,
                    TokenAuthenticatorError::connection,
                )
            })?;

        if row.is_none() {
            debug!(token = %token.fingerprint(), "no profile carries this token");
        }
        row.map(user_from_row)
            .transpose()
            .map_err(|err| TokenAuthenticatorError::query(err.to_string()))
    }
}
