//! Builds the HTTP state from either the PostgreSQL adapters or the
//! in-memory store.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use polls_backend::domain::ports::{CommentRepository, PollRepository, TokenAuthenticator};
use polls_backend::domain::{CommentPolicy, CommentService};
use polls_backend::inbound::http::state::HttpState;
use polls_backend::outbound::memory::InMemoryStore;
use polls_backend::outbound::persistence::{
    DieselCommentRepository, DieselPollRepository, DieselTokenAuthenticator,
};

use super::ServerConfig;

/// Wire the comment service over the given adapters.
fn compose<P, C>(
    polls: Arc<P>,
    comments: Arc<C>,
    authenticator: Arc<dyn TokenAuthenticator>,
    policy: CommentPolicy,
) -> HttpState
where
    P: PollRepository + 'static,
    C: CommentRepository + 'static,
{
    let service = CommentService::with_policy(polls, comments, policy);
    HttpState::new(Arc::new(service), authenticator)
}

fn in_memory_state(store: Arc<InMemoryStore>, policy: CommentPolicy) -> HttpState {
    compose(store.clone(), store.clone(), store, policy)
}

/// Build the shared HTTP state for the configured backend.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => compose(
            Arc::new(DieselPollRepository::new(pool.clone())),
            Arc::new(DieselCommentRepository::new(pool.clone())),
            Arc::new(DieselTokenAuthenticator::new(pool.clone())),
            config.policy,
        ),
        None => {
            warn!("no database configured; serving the in-memory demo store");
            in_memory_state(Arc::new(InMemoryStore::with_demo_data()), config.policy)
        }
    };
    web::Data::new(state.with_token_header(config.token_header.clone()))
}
