//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven ports backed by PostgreSQL via
//! `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Publication and ownership rules live in the service.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: driver errors are mapped onto the port error enums.
//!
//! ```ignore
//! use polls_backend::outbound::persistence::{DbPool, DieselCommentRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/polls")).await?;
//! let comments = DieselCommentRepository::new(pool);
//! ```

mod diesel_comment_repository;
pub(crate) mod diesel_helpers;
mod diesel_poll_repository;
mod diesel_token_authenticator;
mod migrations;
mod models;
mod pool;
mod row_mapping;
mod schema;

pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_poll_repository::DieselPollRepository;
pub use diesel_token_authenticator::DieselTokenAuthenticator;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
