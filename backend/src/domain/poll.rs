//! Poll read model.
//!
//! Polls are managed elsewhere; the comment core only needs to know whether a
//! poll exists and whether it is published.

use super::ids::{PollId, UserId};

/// A poll that comments can target.
///
/// ## Invariants
/// - Comments may only be created against polls where `is_published` holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub id: PollId,
    pub title: String,
    pub description: String,
    pub owner_id: UserId,
    pub is_published: bool,
}

impl Poll {
    /// Whether comments may be posted against this poll.
    pub fn accepts_comments(&self) -> bool {
        self.is_published
    }
}
