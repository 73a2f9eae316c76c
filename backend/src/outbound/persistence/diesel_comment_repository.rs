//! PostgreSQL-backed `CommentRepository` implementation using Diesel ORM.
//!
//! Comments are always read together with their author through an inner
//! join on `users`. Deletes run in a transaction that first locks the root
//! row, so a root removed concurrently is reported rather than guessed at.
//! The self-referencing foreign key is checked once per statement, after
//! every targeted row is gone.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, CommentId, NewComment};

use super::diesel_helpers::{map_comment_delete_error, map_comment_diesel_error, map_pool_error};
use super::models::{CommentRow, NewCommentRow, UserRow};
use super::pool::DbPool;
use super::row_mapping::comment_from_rows;
use super::schema::{comments, users};

/// Diesel-backed implementation of the `CommentRepository` port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load(&self, comment_id: i64) -> Result<Option<Comment>, CommentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CommentRepositoryError::connection))?;

        let rows = comments::table
            .inner_join(users::table)
            .filter(comments::id.eq(comment_id))
            .select((CommentRow::as_select(), UserRow::as_select()))
            .first::<(CommentRow, UserRow)>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_comment_diesel_error(err, "find comment"))?;

        rows.map(|(row, author)| comment_from_rows(row, author))
            .transpose()
            .map_err(|err| CommentRepositoryError::query(err.to_string()))
    }
}

/// Lock the row so it cannot vanish before the transaction commits.
async fn lock_comment(
    conn: &mut AsyncPgConnection,
    comment_id: i64,
) -> Result<bool, diesel::result::Error> {
    let locked = comments::table
        .filter(comments::id.eq(comment_id))
        .select(comments::id)
        .for_update()
        .first::<i64>(conn)
        .await
        .optional()?;
    Ok(locked.is_some())
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn find_by_id(
        &self,
        comment_id: CommentId,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        self.load(comment_id.get()).await
    }

    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let inserted_id = {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, CommentRepositoryError::connection))?;

            diesel::insert_into(comments::table)
                .values(NewCommentRow {
                    poll_id: comment.poll_id.get(),
                    parent_id: comment.parent_id.map(CommentId::get),
                    user_id: comment.author_id.get(),
                    text: comment.text.as_ref(),
                    is_published: comment.is_published,
                })
                .returning(comments::id)
                .get_result::<i64>(&mut conn)
                .await
                .map_err(|err| map_comment_diesel_error(err, "insert comment"))?
        };

        self.load(inserted_id).await?.ok_or_else(|| {
            CommentRepositoryError::query("inserted comment could not be read back")
        })
    }

    async fn reply_ids(
        &self,
        comment_id: CommentId,
    ) -> Result<Vec<CommentId>, CommentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CommentRepositoryError::connection))?;

        let ids = comments::table
            .filter(comments::parent_id.eq(comment_id.get()))
            .order(comments::id.asc())
            .select(comments::id)
            .load::<i64>(&mut conn)
            .await
            .map_err(|err| map_comment_diesel_error(err, "list replies"))?;

        ids.into_iter()
            .map(|id| {
                CommentId::new(id).map_err(|err| CommentRepositoryError::query(err.to_string()))
            })
            .collect()
    }

    async fn delete_thread(
        &self,
        root: CommentId,
        descendants: &[CommentId],
    ) -> Result<Option<u64>, CommentRepositoryError> {
        let root = root.get();
        let mut raw_ids: Vec<i64> = descendants
            .iter()
            .map(|id| id.get())
            .filter(|id| *id != root)
            .collect();
        raw_ids.push(root);
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CommentRepositoryError::connection))?;

        conn.transaction(|conn| {
            async move {
                if !lock_comment(conn, root).await? {
                    return Ok(None);
                }
                let deleted = diesel::delete(comments::table.filter(comments::id.eq_any(raw_ids)))
                    .execute(conn)
                    .await?;
                Ok(Some((deleted as u64).saturating_sub(1)))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_comment_delete_error(err, "delete comment thread"))
    }

    async fn delete_detaching_replies(
        &self,
        comment_id: CommentId,
    ) -> Result<Option<u64>, CommentRepositoryError> {
        let comment_id = comment_id.get();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CommentRepositoryError::connection))?;

        conn.transaction(|conn| {
            async move {
                if !lock_comment(conn, comment_id).await? {
                    return Ok(None);
                }
                let replies = comments::table.filter(comments::parent_id.eq(comment_id));
                let detached = diesel::update(replies)
                    .set(comments::parent_id.eq(None::<i64>))
                    .execute(conn)
                    .await?;
                diesel::delete(comments::table.filter(comments::id.eq(comment_id)))
                    .execute(conn)
                    .await?;
                Ok(Some(detached as u64))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_comment_delete_error(err, "delete comment detaching replies"))
    }
}
