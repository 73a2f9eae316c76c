//! Shared Diesel error mapping for the repository adapters.
//!
//! Raw driver messages are logged at `debug` and replaced with short, stable
//! messages before they reach a port error, so SQL details never leave the
//! adapter.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::CommentRepositoryError;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.into_message())
}

/// Map common Diesel error variants into query/connection constructors.
pub(crate) fn map_basic_diesel_error<E, Q, C>(
    error: DieselError,
    operation: &str,
    query: Q,
    connection: C,
) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        other => debug!(error = %other, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        _ => query("database error"),
    }
}

/// Map Diesel errors from comment writes, surfacing foreign key violations
/// as missing references.
pub(crate) fn map_comment_diesel_error(
    error: DieselError,
    operation: &str,
) -> CommentRepositoryError {
    map_comment_error_with(error, operation, CommentRepositoryError::missing_reference)
}

/// Map Diesel errors from comment deletes. A foreign key violation there
/// means a reply outside the deleted set still points into it.
pub(crate) fn map_comment_delete_error(
    error: DieselError,
    operation: &str,
) -> CommentRepositoryError {
    map_comment_error_with(error, operation, CommentRepositoryError::has_replies)
}

fn map_comment_error_with<F>(
    error: DieselError,
    operation: &str,
    foreign_key: F,
) -> CommentRepositoryError
where
    F: FnOnce(String) -> CommentRepositoryError,
{
    if let DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) = &error {
        let constraint = info.constraint_name().unwrap_or("unknown constraint");
        debug!(%constraint, %operation, "comment write hit a foreign key violation");
        return foreign_key(constraint.to_owned());
    }
    map_basic_diesel_error(
        error,
        operation,
        CommentRepositoryError::query,
        CommentRepositoryError::connection,
    )
}
