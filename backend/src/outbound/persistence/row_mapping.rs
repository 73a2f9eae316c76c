//! Conversions from Diesel rows into domain types.
//!
//! Rows come from a schema with matching constraints, so a failed conversion
//! means the database holds data the domain rejects. Callers report it as a
//! query error rather than panicking.

use crate::domain::{
    Comment, CommentId, CommentText, IdValidationError, Poll, PollId, User, UserId,
};

use super::models::{CommentRow, PollRow, UserRow};

/// Reasons a stored row cannot become a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum RowConversionError {
    #[error("invalid identifier in {table}: {source}")]
    Identifier {
        table: &'static str,
        source: IdValidationError,
    },
    #[error("invalid value in {table}.{column}")]
    Value {
        table: &'static str,
        column: &'static str,
    },
}

fn id_error(table: &'static str) -> impl Fn(IdValidationError) -> RowConversionError {
    move |source| RowConversionError::Identifier { table, source }
}

pub(crate) fn user_from_row(row: UserRow) -> Result<User, RowConversionError> {
    let id = UserId::new(row.id).map_err(id_error("users"))?;
    User::try_new(id, row.username, row.email).map_err(|_| RowConversionError::Value {
        table: "users",
        column: "username",
    })
}

pub(crate) fn poll_from_row(row: PollRow) -> Result<Poll, RowConversionError> {
    Ok(Poll {
        id: PollId::new(row.id).map_err(id_error("polls"))?,
        title: row.title,
        description: row.description,
        owner_id: UserId::new(row.owner_id).map_err(id_error("polls"))?,
        is_published: row.is_published,
    })
}

pub(crate) fn comment_from_rows(
    row: CommentRow,
    author: UserRow,
) -> Result<Comment, RowConversionError> {
    let parent_id = row
        .parent_id
        .map(CommentId::new)
        .transpose()
        .map_err(id_error("comments"))?;
    Ok(Comment {
        id: CommentId::new(row.id).map_err(id_error("comments"))?,
        poll_id: PollId::new(row.poll_id).map_err(id_error("comments"))?,
        parent_id,
        author: user_from_row(author)?,
        text: CommentText::new(&row.text).map_err(|_| RowConversionError::Value {
            table: "comments",
            column: "text",
        })?,
        is_published: row.is_published,
        created_at: row.created_at,
    })
}
