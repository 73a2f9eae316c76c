//! Driven port for comment persistence.
//!
//! The repository stores rows and enforces referential integrity only. Rules
//! such as "parent must be on the same poll" or "only the author may delete"
//! live in the comment service.

use async_trait::async_trait;

use crate::domain::{Comment, CommentId, NewComment};

use super::define_port_error;

define_port_error! {
    /// Errors raised by comment repository adapters.
    pub enum CommentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "comment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "comment repository query failed: {message}",
        /// A referenced poll, user or parent comment no longer exists.
        MissingReference { message: String } =>
            "referenced row is missing: {message}",
        /// A comment outside the delete set still replies to one inside it.
        HasReplies { message: String } =>
            "comment still has replies: {message}",
    }
}

/// Port for comment storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Fetch a comment, including its author, by identifier.
    async fn find_by_id(
        &self,
        comment_id: CommentId,
    ) -> Result<Option<Comment>, CommentRepositoryError>;

    /// Persist a new comment and return the stored row.
    ///
    /// Fails with [`CommentRepositoryError::MissingReference`] when the poll,
    /// author or parent vanished before the insert landed.
    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError>;

    /// Identifiers of the direct replies to `comment_id`.
    async fn reply_ids(
        &self,
        comment_id: CommentId,
    ) -> Result<Vec<CommentId>, CommentRepositoryError>;

    /// Remove `root` and `descendants` atomically.
    ///
    /// Returns how many of `descendants` were removed, or `None` when `root`
    /// no longer exists, in which case nothing is removed. Fails with
    /// [`CommentRepositoryError::HasReplies`], removing nothing, when another
    /// comment still replies to a row in the set.
    async fn delete_thread(
        &self,
        root: CommentId,
        descendants: &[CommentId],
    ) -> Result<Option<u64>, CommentRepositoryError>;

    /// Clear the parent reference of every direct reply and remove the
    /// comment, atomically.
    ///
    /// Returns how many replies were detached, or `None` when the comment no
    /// longer exists, in which case nothing changes.
    async fn delete_detaching_replies(
        &self,
        comment_id: CommentId,
    ) -> Result<Option<u64>, CommentRepositoryError>;
}
