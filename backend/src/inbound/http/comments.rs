//! Comment HTTP handlers.
//!
//! ```text
//! POST /comments/send/    Token: <api_token>   text, poll_id, parent_comment_id?
//! POST /comments/delete/  Token: <api_token>   comment_id
//! ```
//!
//! Both handlers authenticate before reading the form, so an unauthenticated
//! request is rejected with 401 whatever its body looks like. Bodies that are
//! absent or not form encoded are treated as empty forms; bodies over the
//! form size limit are refused with 413.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateCommentRequest, DeleteCommentRequest, DeleteCommentResponse};
use crate::domain::{Comment, CommentId, CommentText, Error, PollId, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{TokenCredentials, authenticate};
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldError, FieldName, parse_optional_id, parse_required_id};

const TEXT: FieldName = FieldName::new("text");
const POLL_ID: FieldName = FieldName::new("poll_id");
const PARENT_COMMENT_ID: FieldName = FieldName::new("parent_comment_id");
const COMMENT_ID: FieldName = FieldName::new("comment_id");

/// Form body for posting a comment.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct SendCommentForm {
    /// Comment body; blank text counts as missing.
    pub text: Option<String>,
    /// Target poll identifier.
    #[schema(value_type = Option<i64>)]
    pub poll_id: Option<String>,
    /// Comment being replied to, on the same poll.
    #[schema(value_type = Option<i64>)]
    pub parent_comment_id: Option<String>,
}

/// Form body for deleting a comment.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct DeleteCommentForm {
    /// Comment to delete; must be owned by the caller.
    #[schema(value_type = Option<i64>)]
    pub comment_id: Option<String>,
}

/// Serialised view of a stored comment.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedCommentResponse {
    pub id: i64,
    pub poll_id: i64,
    /// Omitted for top-level comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<i64>,
    pub text: String,
    /// Author as `{id, username, email}`.
    #[schema(value_type = UserSchema)]
    pub user: User,
    pub is_published: bool,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Response body for `POST /comments/send/`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SendCommentResponse {
    pub created_comment: CreatedCommentResponse,
}

/// Response body for `POST /comments/delete/`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedCommentResponse {
    pub deleted_comment_id: i64,
    /// Descendants removed by the cascade reply policy.
    pub removed_replies: u64,
    /// Replies detached by the orphan reply policy.
    pub orphaned_replies: u64,
}

impl From<Comment> for CreatedCommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.get(),
            poll_id: comment.poll_id.get(),
            parent_comment_id: comment.parent_id.map(CommentId::get),
            text: comment.text.into(),
            user: comment.author,
            is_published: comment.is_published,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

impl From<DeleteCommentResponse> for DeletedCommentResponse {
    fn from(response: DeleteCommentResponse) -> Self {
        Self {
            deleted_comment_id: response.comment_id.get(),
            removed_replies: response.removed_replies,
            orphaned_replies: response.orphaned_replies,
        }
    }
}

/// Unwrap an optional form body. A missing or non-form body reads as an
/// empty form; only an oversized one is an error.
fn form_or_default<T: Default>(form: Result<web::Form<T>, actix_web::Error>) -> Result<T, Error> {
    match form {
        Ok(form) => Ok(form.into_inner()),
        Err(err) if err.as_response_error().status_code() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(Error::payload_too_large("form body too large"))
        }
        Err(_) => Ok(T::default()),
    }
}

#[derive(Debug)]
struct ParsedSendForm {
    text: CommentText,
    poll_id: PollId,
    parent_id: Option<CommentId>,
}

fn parse_send_form(form: SendCommentForm) -> Result<ParsedSendForm, Error> {
    let text = form
        .text
        .and_then(|raw| CommentText::new(raw).ok())
        .ok_or_else(|| FieldError::missing(TEXT).into_invalid_request())?;
    let poll_id =
        parse_required_id(form.poll_id, POLL_ID).map_err(FieldError::into_invalid_request)?;
    let parent_id = parse_optional_id(form.parent_comment_id, PARENT_COMMENT_ID)
        .map_err(FieldError::into_invalid_request)?;
    Ok(ParsedSendForm {
        text,
        poll_id,
        parent_id,
    })
}

fn parse_delete_form(form: DeleteCommentForm) -> Result<CommentId, Error> {
    parse_required_id(form.comment_id, COMMENT_ID)
        .map_err(|err| err.into_not_found("comment not found"))
}

/// Post a comment on a published poll, optionally as a reply.
#[utoipa::path(
    post,
    path = "/comments/send/",
    request_body(
        content = SendCommentForm,
        content_type = "application/x-www-form-urlencoded"
    ),
    params(
        ("Token" = String, Header, description = "API token of the commenting user")
    ),
    responses(
        (status = 201, description = "Comment created", body = SendCommentResponse),
        (status = 400, description = "Missing or malformed field", body = ErrorSchema),
        (status = 401, description = "Missing or unknown token", body = ErrorSchema),
        (status = 404, description = "Poll or parent comment not found", body = ErrorSchema),
        (status = 413, description = "Form body too large", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "sendComment"
)]
#[post("/comments/send/")]
pub async fn send_comment(
    state: web::Data<HttpState>,
    credentials: TokenCredentials,
    form: Result<web::Form<SendCommentForm>, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    let author = authenticate(state.authenticator.as_ref(), &credentials).await?;
    let parsed = parse_send_form(form_or_default(form)?)?;
    let response = state
        .comments
        .create_comment(CreateCommentRequest {
            author,
            poll_id: parsed.poll_id,
            parent_id: parsed.parent_id,
            text: parsed.text,
        })
        .await?;
    Ok(HttpResponse::Created().json(SendCommentResponse {
        created_comment: CreatedCommentResponse::from(response.comment),
    }))
}

/// Delete a comment owned by the caller.
#[utoipa::path(
    post,
    path = "/comments/delete/",
    request_body(
        content = DeleteCommentForm,
        content_type = "application/x-www-form-urlencoded"
    ),
    params(
        ("Token" = String, Header, description = "API token of the comment owner")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = DeletedCommentResponse),
        (status = 401, description = "Missing or unknown token", body = ErrorSchema),
        (status = 403, description = "Comment owned by another user", body = ErrorSchema),
        (status = 404, description = "Comment id missing, malformed or unknown", body = ErrorSchema),
        (status = 409, description = "Replies exist under the restrict policy", body = ErrorSchema),
        (status = 413, description = "Form body too large", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[post("/comments/delete/")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    credentials: TokenCredentials,
    form: Result<web::Form<DeleteCommentForm>, actix_web::Error>,
) -> ApiResult<web::Json<DeletedCommentResponse>> {
    let requester = authenticate(state.authenticator.as_ref(), &credentials).await?;
    let comment_id = parse_delete_form(form_or_default(form)?)?;
    let response = state
        .comments
        .delete_comment(DeleteCommentRequest {
            requester_id: requester.id(),
            comment_id,
        })
        .await?;
    Ok(web::Json(DeletedCommentResponse::from(response)))
}

#[cfg(test)]
#[path = "comments_tests.rs"]
mod tests;
