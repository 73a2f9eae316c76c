//! Driving port for comment creation and deletion.
//!
//! Inbound adapters authenticate the caller, parse the request, and hand the
//! typed request to this port. Every failure comes back as a domain
//! [`Error`] so the adapter only has to translate codes.

use async_trait::async_trait;

use crate::domain::{Comment, CommentId, CommentText, Error, PollId, User, UserId};

/// Request to post a comment on a poll.
#[derive(Debug, Clone)]
pub struct CreateCommentRequest {
    /// Authenticated author.
    pub author: User,
    /// Target poll; must exist and be published.
    pub poll_id: PollId,
    /// Optional parent; must exist, be published, and belong to `poll_id`.
    pub parent_id: Option<CommentId>,
    /// Validated comment body.
    pub text: CommentText,
}

/// Response from posting a comment.
#[derive(Debug, Clone)]
pub struct CreateCommentResponse {
    /// The stored comment.
    pub comment: Comment,
}

/// Request to delete a comment.
#[derive(Debug, Clone)]
pub struct DeleteCommentRequest {
    /// Authenticated caller; must own the comment.
    pub requester_id: UserId,
    /// Comment to remove.
    pub comment_id: CommentId,
}

/// Response from deleting a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteCommentResponse {
    /// The removed comment.
    pub comment_id: CommentId,
    /// Replies removed along with it under the cascade policy.
    pub removed_replies: u64,
    /// Replies whose parent reference was cleared under the orphan policy.
    pub orphaned_replies: u64,
}

/// Driving port for comment use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentCommand: Send + Sync {
    /// Validate and persist a new comment.
    ///
    /// # Errors
    ///
    /// - [`crate::domain::ErrorCode::NotFound`] when the poll or parent is
    ///   missing, unpublished, or (for the parent) on another poll.
    /// - [`crate::domain::ErrorCode::ServiceUnavailable`] when the store is
    ///   unreachable.
    async fn create_comment(
        &self,
        request: CreateCommentRequest,
    ) -> Result<CreateCommentResponse, Error>;

    /// Delete a comment owned by the requester.
    ///
    /// # Errors
    ///
    /// - [`crate::domain::ErrorCode::NotFound`] when the comment does not exist.
    /// - [`crate::domain::ErrorCode::Forbidden`] when another user owns it.
    /// - [`crate::domain::ErrorCode::Conflict`] when replies exist and the
    ///   configured policy is restrict.
    async fn delete_comment(
        &self,
        request: DeleteCommentRequest,
    ) -> Result<DeleteCommentResponse, Error>;
}
