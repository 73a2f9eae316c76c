//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{comments, polls, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Row struct for reading from the polls table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = polls)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PollRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner_id: i64,
    pub is_published: bool,
}

/// Row struct for reading from the comments table.
///
/// The author is loaded through a join on `users`, so `user_id` is not
/// selected here.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: i64,
    pub poll_id: i64,
    pub parent_id: Option<i64>,
    pub text: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new comment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub poll_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub text: &'a str,
    pub is_published: bool,
}
