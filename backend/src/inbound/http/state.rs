//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they depend only on
//! domain ports and remain testable without I/O.

use std::sync::Arc;

use actix_web::http::header::HeaderName;

use crate::domain::ports::{CommentCommand, TokenAuthenticator};

/// Header carrying the API token unless configured otherwise.
pub const DEFAULT_TOKEN_HEADER: &str = "token";

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub comments: Arc<dyn CommentCommand>,
    pub authenticator: Arc<dyn TokenAuthenticator>,
    pub token_header: HeaderName,
}

impl HttpState {
    /// Construct state reading tokens from the default `Token` header.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use polls_backend::domain::CommentService;
    /// use polls_backend::inbound::http::state::HttpState;
    /// use polls_backend::outbound::memory::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::with_demo_data());
    /// let service = CommentService::new(store.clone(), store.clone());
    /// let state = HttpState::new(Arc::new(service), store);
    /// assert_eq!(state.token_header.as_str(), "token");
    /// ```
    pub fn new(
        comments: Arc<dyn CommentCommand>,
        authenticator: Arc<dyn TokenAuthenticator>,
    ) -> Self {
        Self {
            comments,
            authenticator,
            token_header: HeaderName::from_static(DEFAULT_TOKEN_HEADER),
        }
    }

    /// Read tokens from `header` instead of the default.
    #[must_use]
    pub fn with_token_header(mut self, header: HeaderName) -> Self {
        self.token_header = header;
        self
    }
}
