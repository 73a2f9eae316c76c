//! Comment aggregate, its validated text, and the reply-handling policy.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CommentId, PollId, UserId};
use super::user::User;

/// Validation errors for comment text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentTextValidationError {
    /// Text was blank once trimmed.
    #[error("comment text must not be empty")]
    Empty,
}

/// Comment body.
///
/// ## Invariants
/// - Stored trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentText(String);

impl CommentText {
    /// Trim and validate raw text.
    ///
    /// # Examples
    /// ```
    /// use polls_backend::domain::CommentText;
    ///
    /// let text = CommentText::new("  hello  ").expect("non-blank text");
    /// assert_eq!(text.as_ref(), "hello");
    /// assert!(CommentText::new(" \n ").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CommentTextValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CommentTextValidationError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CommentText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CommentText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CommentText> for String {
    fn from(value: CommentText) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommentText {
    type Error = CommentTextValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A persisted comment together with its author.
///
/// ## Invariants
/// - `parent_id`, when present, names a comment on the same `poll_id`.
/// - Only `author` may delete the comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub poll_id: PollId,
    pub parent_id: Option<CommentId>,
    pub author: User,
    pub text: CommentText,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Whether `user_id` owns this comment.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.author.id() == user_id
    }

    /// Whether the comment can serve as a reply target on `poll_id`.
    pub fn accepts_replies_on(&self, poll_id: PollId) -> bool {
        self.poll_id == poll_id && self.is_published
    }
}

/// Insert payload for a new comment; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub poll_id: PollId,
    pub parent_id: Option<CommentId>,
    pub author_id: UserId,
    pub text: CommentText,
    pub is_published: bool,
}

/// How replies are treated when their parent comment is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyPolicy {
    /// Remove replies and all of their descendants.
    #[default]
    Cascade,
    /// Keep replies and clear their parent reference.
    Orphan,
    /// Refuse to delete a comment that still has replies.
    Restrict,
}

/// Error returned when a reply policy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reply policy `{0}`; expected cascade, orphan or restrict")]
pub struct ParseReplyPolicyError(String);

impl FromStr for ReplyPolicy {
    type Err = ParseReplyPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(Self::Cascade),
            "orphan" => Ok(Self::Orphan),
            "restrict" => Ok(Self::Restrict),
            other => Err(ParseReplyPolicyError(other.to_owned())),
        }
    }
}

impl fmt::Display for ReplyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cascade => "cascade",
            Self::Orphan => "orphan",
            Self::Restrict => "restrict",
        };
        f.write_str(name)
    }
}
