//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod comment_command;
mod comment_repository;
mod poll_repository;
mod token_authenticator;

#[cfg(test)]
pub use comment_command::MockCommentCommand;
pub use comment_command::{
    CommentCommand, CreateCommentRequest, CreateCommentResponse, DeleteCommentRequest,
    DeleteCommentResponse,
};
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, CommentRepositoryError};
#[cfg(test)]
pub use poll_repository::MockPollRepository;
pub use poll_repository::{PollRepository, PollRepositoryError};
#[cfg(test)]
pub use token_authenticator::MockTokenAuthenticator;
pub use token_authenticator::{TokenAuthenticator, TokenAuthenticatorError};
