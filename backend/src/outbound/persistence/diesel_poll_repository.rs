//! PostgreSQL-backed `PollRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PollRepository, PollRepositoryError};
use crate::domain::{Poll, PollId};

use super::diesel_helpers::{map_basic_diesel_error, map_pool_error};
use super::models::PollRow;
use super::pool::DbPool;
use super::row_mapping::poll_from_row;
use super::schema::polls;

/// Diesel-backed implementation of the `PollRepository` port.
#[derive(Clone)]
pub struct DieselPollRepository {
    pool: DbPool,
}

impl DieselPollRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollRepository for DieselPollRepository {
    async fn find_by_id(&self, poll_id: PollId) -> Result<Option<Poll>, PollRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        let row = polls::table
            .filter(polls::id.eq(poll_id.get()))
            .select(PollRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                map_basic_diesel_error(
                    err,
                    "find poll",
                    PollRepositoryError::query,
                    PollRepositoryError::connection,
                )
            })?;

        row.map(poll_from_row)
            .transpose()
            .map_err(|err| PollRepositoryError::query(err.to_string()))
    }
}
