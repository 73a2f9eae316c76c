//! Comment domain service.
//!
//! Implements [`CommentCommand`] on top of the poll and comment repositories.
//! Every check runs before any write, so a rejected request leaves the store
//! untouched. "Missing" and "hidden" (unpublished, wrong poll) collapse into
//! the same not-found error so callers cannot discover unpublished content.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    CommentCommand, CommentRepository, CommentRepositoryError, CreateCommentRequest,
    CreateCommentResponse, DeleteCommentRequest, DeleteCommentResponse, PollRepository,
    PollRepositoryError,
};
use crate::domain::{Comment, CommentId, Error, NewComment, ReplyPolicy};

/// Moderation and reply-handling knobs for the comment service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentPolicy {
    /// Published state assigned to newly created comments.
    pub publish_by_default: bool,
    /// Treatment of replies when their parent is deleted.
    pub reply_policy: ReplyPolicy,
}

impl Default for CommentPolicy {
    fn default() -> Self {
        Self {
            publish_by_default: true,
            reply_policy: ReplyPolicy::Cascade,
        }
    }
}

/// Comment service implementing the driving port.
#[derive(Clone)]
pub struct CommentService<P, C> {
    polls: Arc<P>,
    comments: Arc<C>,
    policy: CommentPolicy,
}

impl<P, C> CommentService<P, C> {
    /// Create a new service with the default policy.
    pub fn new(polls: Arc<P>, comments: Arc<C>) -> Self {
        Self::with_policy(polls, comments, CommentPolicy::default())
    }

    /// Create a new service with an explicit policy.
    pub fn with_policy(polls: Arc<P>, comments: Arc<C>, policy: CommentPolicy) -> Self {
        Self {
            polls,
            comments,
            policy,
        }
    }
}

fn poll_not_found() -> Error {
    Error::not_found("poll not found").with_details(json!({
        "field": "poll_id",
        "code": "poll_not_found",
    }))
}

fn parent_not_found() -> Error {
    Error::not_found("parent comment not found").with_details(json!({
        "field": "parent_comment_id",
        "code": "parent_comment_not_found",
    }))
}

fn comment_has_replies(replies: Option<usize>) -> Error {
    let mut details = json!({
        "field": "comment_id",
        "code": "comment_has_replies",
    });
    if let Some(count) = replies {
        details["replies"] = json!(count);
    }
    Error::conflict("comment has replies").with_details(details)
}

fn comment_not_found() -> Error {
    Error::not_found("comment not found").with_details(json!({
        "field": "comment_id",
        "code": "comment_not_found",
    }))
}

impl<P, C> CommentService<P, C>
where
    P: PollRepository,
    C: CommentRepository,
{
    fn map_poll_error(error: PollRepositoryError) -> Error {
        match error {
            PollRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("poll repository unavailable: {message}"))
            }
            PollRepositoryError::Query { message } => {
                Error::internal(format!("poll repository error: {message}"))
            }
        }
    }

    fn map_comment_error(error: CommentRepositoryError) -> Error {
        match error {
            CommentRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("comment repository unavailable: {message}"))
            }
            CommentRepositoryError::Query { message } => {
                Error::internal(format!("comment repository error: {message}"))
            }
            // The poll or parent disappeared between validation and insert.
            CommentRepositoryError::MissingReference { message } => {
                debug!(%message, "comment insert lost a reference race");
                Error::not_found("poll or parent comment not found")
            }
            // A reply was added between the descendant walk and the delete.
            CommentRepositoryError::HasReplies { message } => {
                debug!(%message, "comment delete lost a reply race");
                comment_has_replies(None)
            }
        }
    }

    async fn require_parent(
        &self,
        request: &CreateCommentRequest,
        parent_id: CommentId,
    ) -> Result<Comment, Error> {
        let parent = self
            .comments
            .find_by_id(parent_id)
            .await
            .map_err(Self::map_comment_error)?;
        match parent {
            Some(parent) if parent.accepts_replies_on(request.poll_id) => Ok(parent),
            _ => {
                debug!(%parent_id, poll_id = %request.poll_id, "parent comment rejected");
                Err(parent_not_found())
            }
        }
    }

    /// Collect every descendant of `root`, breadth first.
    async fn collect_descendants(&self, root: CommentId) -> Result<Vec<CommentId>, Error> {
        let mut seen = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);
        let mut descendants = Vec::new();
        while let Some(current) = queue.pop_front() {
            let replies = self
                .comments
                .reply_ids(current)
                .await
                .map_err(Self::map_comment_error)?;
            for reply in replies {
                if seen.insert(reply) {
                    descendants.push(reply);
                    queue.push_back(reply);
                }
            }
        }
        Ok(descendants)
    }

    async fn delete_with_policy(
        &self,
        comment_id: CommentId,
    ) -> Result<DeleteCommentResponse, Error> {
        // Each arm yields `(removed, orphaned)` reply counts.
        let outcome = match self.policy.reply_policy {
            ReplyPolicy::Restrict => {
                let replies = self
                    .comments
                    .reply_ids(comment_id)
                    .await
                    .map_err(Self::map_comment_error)?;
                if !replies.is_empty() {
                    return Err(comment_has_replies(Some(replies.len())));
                }
                self.comments
                    .delete_thread(comment_id, &[])
                    .await
                    .map(|removed| removed.map(|count| (count, 0)))
            }
            ReplyPolicy::Orphan => self
                .comments
                .delete_detaching_replies(comment_id)
                .await
                .map(|detached| detached.map(|count| (0, count))),
            ReplyPolicy::Cascade => {
                let descendants = self.collect_descendants(comment_id).await?;
                self.comments
                    .delete_thread(comment_id, &descendants)
                    .await
                    .map(|removed| removed.map(|count| (count, 0)))
            }
        };

        // `None` means a concurrent delete removed the comment first.
        let Some((removed_replies, orphaned_replies)) =
            outcome.map_err(Self::map_comment_error)?
        else {
            return Err(comment_not_found());
        };
        Ok(DeleteCommentResponse {
            comment_id,
            removed_replies,
            orphaned_replies,
        })
    }
}

#[async_trait]
impl<P, C> CommentCommand for CommentService<P, C>
where
    P: PollRepository,
    C: CommentRepository,
{
    async fn create_comment(
        &self,
        request: CreateCommentRequest,
    ) -> Result<CreateCommentResponse, Error> {
        let poll = self
            .polls
            .find_by_id(request.poll_id)
            .await
            .map_err(Self::map_poll_error)?;
        if !poll.is_some_and(|poll| poll.accepts_comments()) {
            debug!(poll_id = %request.poll_id, "poll missing or unpublished");
            return Err(poll_not_found());
        }

        if let Some(parent_id) = request.parent_id {
            self.require_parent(&request, parent_id).await?;
        }

        let new_comment = NewComment {
            poll_id: request.poll_id,
            parent_id: request.parent_id,
            author_id: request.author.id(),
            text: request.text,
            is_published: self.policy.publish_by_default,
        };
        let comment = self
            .comments
            .insert(&new_comment)
            .await
            .map_err(Self::map_comment_error)?;
        info!(
            comment_id = %comment.id,
            poll_id = %comment.poll_id,
            author_id = %comment.author.id(),
            "comment created"
        );
        Ok(CreateCommentResponse { comment })
    }

    async fn delete_comment(
        &self,
        request: DeleteCommentRequest,
    ) -> Result<DeleteCommentResponse, Error> {
        let existing = self
            .comments
            .find_by_id(request.comment_id)
            .await
            .map_err(Self::map_comment_error)?
            .ok_or_else(comment_not_found)?;

        if !existing.is_owned_by(request.requester_id) {
            debug!(
                comment_id = %request.comment_id,
                requester_id = %request.requester_id,
                "delete refused for non-owner"
            );
            return Err(Error::forbidden("not authorised to delete this comment"));
        }

        let response = self.delete_with_policy(request.comment_id).await?;
        info!(
            comment_id = %response.comment_id,
            removed_replies = response.removed_replies,
            orphaned_replies = response.orphaned_replies,
            policy = %self.policy.reply_policy,
            "comment deleted"
        );
        Ok(response)
    }
}

#[cfg(test)]
#[path = "comment_service_tests.rs"]
mod tests;
