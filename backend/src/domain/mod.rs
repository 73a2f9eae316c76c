//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define the strongly typed comment core independent of HTTP or
//! storage. Inbound adapters call the driving port
//! ([`ports::CommentCommand`]); outbound adapters implement the driven ports
//! ([`ports::TokenAuthenticator`], [`ports::PollRepository`],
//! [`ports::CommentRepository`]).
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic failure payload.
//! - UserId / PollId / CommentId: positive integer identifiers.
//! - User, Poll, Comment: read models and the comment aggregate.
//! - ApiToken: zeroizing credential presented by clients.
//! - CommentService: the driving port implementation.

pub mod auth;
pub mod comment;
pub mod comment_service;
pub mod error;
pub mod ids;
pub mod poll;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::auth::{ApiToken, ApiTokenValidationError};
pub use self::comment::{
    Comment, CommentText, CommentTextValidationError, NewComment, ParseReplyPolicyError,
    ReplyPolicy,
};
pub use self::comment_service::{CommentPolicy, CommentService};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ids::{CommentId, IdValidationError, PollId, UserId};
pub use self::poll::Poll;
pub use self::trace_id::TraceId;
pub use self::user::{User, UserValidationError};
