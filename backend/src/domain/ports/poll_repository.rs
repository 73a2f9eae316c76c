//! Driven port for read-only poll lookups.

use async_trait::async_trait;

use crate::domain::{Poll, PollId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by poll repository adapters.
    pub enum PollRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "poll repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "poll repository query failed: {message}",
    }
}

/// Port for fetching polls that comments may target.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Fetch a poll by identifier, published or not.
    async fn find_by_id(&self, poll_id: PollId) -> Result<Option<Poll>, PollRepositoryError>;
}
