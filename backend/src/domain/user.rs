//! User identity as seen by the comment core.
//!
//! Users are owned by the authentication subsystem; this crate only reads
//! them, so there is no registration or update path here.

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// Validation errors returned by [`User::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Username was blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
}

/// Application user.
///
/// ## Invariants
/// - `username` is non-empty once trimmed.
/// - `email` may be empty; the authentication subsystem does not require it.
///
/// # Examples
/// ```
/// use polls_backend::domain::{User, UserId};
///
/// let id = UserId::new(1).expect("positive id");
/// let user = User::try_new(id, "ada", "ada@example.com").expect("valid user");
/// assert_eq!(user.username(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
}

impl User {
    /// Validate and construct a user.
    pub fn try_new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        Ok(Self {
            id,
            username,
            email: email.into(),
        })
    }

    /// Stable user identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Unique login name.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Contact address; may be empty.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}
