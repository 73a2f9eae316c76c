//! Shared helpers for HTTP integration tests running against the
//! in-memory store.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use polls_backend::Trace;
use polls_backend::domain::{
    CommentId, CommentPolicy, CommentService, CommentText, NewComment, PollId, ReplyPolicy,
    TRACE_ID_HEADER, UserId,
};
use polls_backend::inbound::http::comments::{delete_comment, send_comment};
use polls_backend::inbound::http::state::HttpState;
use polls_backend::outbound::memory::InMemoryStore;
use serde_json::Value;

/// Token of the demo user owning every demo poll.
pub const OWNER_TOKEN: &str = "1";
/// Token of the second demo user.
pub const OTHER_TOKEN: &str = "2";

/// Published demo polls.
pub const POLL: i64 = 1;
pub const OTHER_POLL: i64 = 2;
/// Unpublished demo poll.
pub const HIDDEN_POLL: i64 = 3;

/// Response captured from one request.
#[derive(Debug)]
pub struct Captured {
    pub status: StatusCode,
    pub trace_id: Option<String>,
    pub body: Value,
}

/// Store plus the reply policy the service runs with.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    policy: CommentPolicy,
}

impl Harness {
    pub fn new(reply_policy: ReplyPolicy) -> Self {
        Self {
            store: Arc::new(InMemoryStore::with_demo_data()),
            policy: CommentPolicy {
                reply_policy,
                ..CommentPolicy::default()
            },
        }
    }

    fn state(&self) -> web::Data<HttpState> {
        let service =
            CommentService::with_policy(self.store.clone(), self.store.clone(), self.policy);
        web::Data::new(HttpState::new(Arc::new(service), self.store.clone()))
    }

    /// POST a form to `uri`, optionally authenticated.
    pub async fn post(&self, uri: &str, token: Option<&str>, form: &[(&str, &str)]) -> Captured {
        let app = test::init_service(
            App::new()
                .app_data(self.state())
                .wrap(Trace)
                .service(send_comment)
                .service(delete_comment),
        )
        .await;
        let mut request = test::TestRequest::post().uri(uri);
        if let Some(token) = token {
            request = request.insert_header(("Token", token));
        }
        if !form.is_empty() {
            request = request.set_form(form);
        }
        let res = test::call_service(&app, request.to_request()).await;
        let status = res.status();
        let trace_id = res
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = test::read_body(res).await;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Captured {
            status,
            trace_id,
            body,
        }
    }

    pub async fn send(&self, token: Option<&str>, form: &[(&str, &str)]) -> Captured {
        self.post("/comments/send/", token, form).await
    }

    pub async fn delete(&self, token: Option<&str>, form: &[(&str, &str)]) -> Captured {
        self.post("/comments/delete/", token, form).await
    }

    /// Insert a comment directly, bypassing the service rules.
    pub fn seed(
        &self,
        poll: i64,
        parent: Option<CommentId>,
        author: i64,
        is_published: bool,
    ) -> CommentId {
        self.store
            .insert_comment(&NewComment {
                poll_id: PollId::new(poll).expect("positive id"),
                parent_id: parent,
                author_id: UserId::new(author).expect("positive id"),
                text: CommentText::new("seeded").expect("non-blank text"),
                is_published,
            })
            .expect("seed comment")
            .id
    }
}
