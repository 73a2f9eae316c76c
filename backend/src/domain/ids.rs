//! Strongly typed integer identifiers for users, polls and comments.
//!
//! Identifiers are positive 64-bit integers, matching the `BIGSERIAL` keys in
//! the relational schema. Form inputs arrive as text, so each identifier can
//! also be parsed from a string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Validation errors raised while constructing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// The raw input was blank.
    #[error("identifier must not be empty")]
    Empty,
    /// The raw input was not a base-10 integer.
    #[error("identifier must be an integer")]
    NotAnInteger,
    /// The integer was zero or negative.
    #[error("identifier must be positive, got {value}")]
    NotPositive { value: i64 },
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Validate and wrap a raw integer identifier.
            pub fn new(value: i64) -> Result<Self, IdValidationError> {
                if value <= 0 {
                    return Err(IdValidationError::NotPositive { value });
                }
                Ok(Self(value))
            }

            /// Raw integer value as stored in the database.
            #[must_use]
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(IdValidationError::Empty);
                }
                let value = trimmed
                    .parse::<i64>()
                    .map_err(|_| IdValidationError::NotAnInteger)?;
                Self::new(value)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = IdValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id! {
    /// Identifier of a registered user.
    UserId
}

define_id! {
    /// Identifier of a poll.
    PollId
}

define_id! {
    /// Identifier of a comment.
    CommentId
}
