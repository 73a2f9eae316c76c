//! Tests for comment HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::App;
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::Value;

use super::*;
use crate::domain::ports::{CreateCommentResponse, MockCommentCommand, MockTokenAuthenticator};
use crate::domain::{ErrorCode, UserId};

fn author() -> User {
    User::try_new(UserId::new(1).expect("positive id"), "user1", "user1@example.com")
        .expect("valid user")
}

fn stored_comment(parent: Option<i64>) -> Comment {
    Comment {
        id: CommentId::new(10).expect("positive id"),
        poll_id: PollId::new(1).expect("positive id"),
        parent_id: parent.map(|raw| CommentId::new(raw).expect("positive id")),
        author: author(),
        text: CommentText::new("hello").expect("non-blank text"),
        is_published: true,
        created_at: Utc
            .with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp"),
    }
}

#[fixture]
fn authenticator() -> MockTokenAuthenticator {
    let mut authenticator = MockTokenAuthenticator::new();
    authenticator
        .expect_resolve()
        .returning(|token| Ok((token.expose() == "1").then(author)));
    authenticator
}

fn send_form(text: Option<&str>, poll_id: Option<&str>, parent: Option<&str>) -> SendCommentForm {
    SendCommentForm {
        text: text.map(str::to_owned),
        poll_id: poll_id.map(str::to_owned),
        parent_comment_id: parent.map(str::to_owned),
    }
}

fn detail(err: &Error, key: &str) -> Option<String> {
    err.details()
        .and_then(|details| details.get(key))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

async fn call(
    comments: MockCommentCommand,
    authenticator: MockTokenAuthenticator,
    request: actix_web::test::TestRequest,
) -> (StatusCode, Value) {
    let state = HttpState::new(Arc::new(comments), Arc::new(authenticator));
    let app = actix_web::test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(send_comment)
            .service(delete_comment),
    )
    .await;
    let res = actix_web::test::call_service(&app, request.to_request()).await;
    let status = res.status();
    let body = actix_web::test::read_body(res).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[rstest]
#[case::missing_text(send_form(None, Some("1"), None), "text", "missing_field")]
#[case::blank_text(send_form(Some("  "), Some("1"), None), "text", "missing_field")]
#[case::missing_poll(send_form(Some("hi"), None, None), "poll_id", "missing_field")]
#[case::malformed_poll(send_form(Some("hi"), Some("abc"), None), "poll_id", "invalid_id")]
#[case::malformed_parent(
    send_form(Some("hi"), Some("1"), Some("-1")),
    "parent_comment_id",
    "invalid_id"
)]
fn parse_send_form_rejects_bad_fields(
    #[case] form: SendCommentForm,
    #[case] field: &str,
    #[case] code: &str,
) {
    let err = parse_send_form(form).expect_err("invalid form");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(detail(&err, "field").as_deref(), Some(field));
    assert_eq!(detail(&err, "code").as_deref(), Some(code));
}

#[rstest]
fn parse_send_form_trims_and_accepts_blank_parent() {
    let parsed = parse_send_form(send_form(Some("  hi  "), Some("2"), Some(""))).expect("valid");
    assert_eq!(parsed.text.as_ref(), "hi");
    assert_eq!(parsed.poll_id.get(), 2);
    assert!(parsed.parent_id.is_none());
}

#[rstest]
#[case(None)]
#[case(Some("x"))]
#[case(Some("0"))]
fn parse_delete_form_reports_not_found(#[case] raw: Option<&str>) {
    let err = parse_delete_form(DeleteCommentForm {
        comment_id: raw.map(str::to_owned),
    })
    .expect_err("bad comment id");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(detail(&err, "field").as_deref(), Some("comment_id"));
}

#[rstest]
fn created_comment_omits_absent_parent() {
    let json = serde_json::to_value(CreatedCommentResponse::from(stored_comment(None)))
        .expect("serialise");
    assert!(json.get("parent_comment_id").is_none());
    assert_eq!(json["user"]["email"], "user1@example.com");
    assert_eq!(json["created_at"], "2025-01-02T03:04:05+00:00");

    let json = serde_json::to_value(CreatedCommentResponse::from(stored_comment(Some(4))))
        .expect("serialise");
    assert_eq!(json["parent_comment_id"], 4);
}

#[rstest]
#[case::no_header(None)]
#[case::unknown_token(Some("nope"))]
#[actix_web::test]
async fn send_requires_known_token(
    authenticator: MockTokenAuthenticator,
    #[case] token: Option<&str>,
) {
    let mut comments = MockCommentCommand::new();
    comments.expect_create_comment().never();

    // No body at all: authentication must still be decided first.
    let mut request = actix_web::test::TestRequest::post().uri("/comments/send/");
    if let Some(token) = token {
        request = request.insert_header(("Token", token));
    }
    let (status, body) = call(comments, authenticator, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

fn oversized_form() -> String {
    format!("poll_id=1&text={}", "a".repeat(20 * 1024))
}

#[rstest]
#[case::send("/comments/send/")]
#[case::delete("/comments/delete/")]
#[actix_web::test]
async fn oversized_forms_are_refused_after_authentication(
    authenticator: MockTokenAuthenticator,
    #[case] uri: &str,
) {
    let mut comments = MockCommentCommand::new();
    comments.expect_create_comment().never();
    comments.expect_delete_comment().never();

    let request = actix_web::test::TestRequest::post()
        .uri(uri)
        .insert_header(("Token", "1"))
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(oversized_form());
    let (status, body) = call(comments, authenticator, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "payload_too_large");
}

#[rstest]
#[actix_web::test]
async fn oversized_forms_without_token_are_unauthorized(authenticator: MockTokenAuthenticator) {
    let mut comments = MockCommentCommand::new();
    comments.expect_create_comment().never();

    let request = actix_web::test::TestRequest::post()
        .uri("/comments/send/")
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(oversized_form());
    let (status, _) = call(comments, authenticator, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn non_form_bodies_read_as_empty_forms(authenticator: MockTokenAuthenticator) {
    let mut comments = MockCommentCommand::new();
    comments.expect_create_comment().never();

    let request = actix_web::test::TestRequest::post()
        .uri("/comments/send/")
        .insert_header(("Token", "1"))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"text":"hi","poll_id":1}"#);
    let (status, body) = call(comments, authenticator, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "text");
}

#[rstest]
#[actix_web::test]
async fn send_rejects_missing_text(authenticator: MockTokenAuthenticator) {
    let mut comments = MockCommentCommand::new();
    comments.expect_create_comment().never();

    let request = actix_web::test::TestRequest::post()
        .uri("/comments/send/")
        .insert_header(("Token", "1"))
        .set_form([("poll_id", "1")]);
    let (status, body) = call(comments, authenticator, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "text");
}

#[rstest]
#[actix_web::test]
async fn send_passes_parsed_request_to_port(authenticator: MockTokenAuthenticator) {
    let mut comments = MockCommentCommand::new();
    comments
        .expect_create_comment()
        .withf(|request| {
            request.author.id().get() == 1
                && request.poll_id.get() == 1
                && request.parent_id.map(CommentId::get) == Some(4)
                && request.text.as_ref() == "hello"
        })
        .times(1)
        .return_once(|_| {
            Ok(CreateCommentResponse {
                comment: stored_comment(Some(4)),
            })
        });

    let request = actix_web::test::TestRequest::post()
        .uri("/comments/send/")
        .insert_header(("Token", "1"))
        .set_form([("text", "hello"), ("poll_id", "1"), ("parent_comment_id", "4")]);
    let (status, body) = call(comments, authenticator, request).await;
    assert_eq!(status, StatusCode::CREATED);
    let created = &body["created_comment"];
    assert_eq!(created["id"], 10);
    assert_eq!(created["poll_id"], 1);
    assert_eq!(created["parent_comment_id"], 4);
    assert_eq!(created["user"]["username"], "user1");
    assert_eq!(created["is_published"], true);
}

#[rstest]
#[actix_web::test]
async fn send_surfaces_domain_not_found(authenticator: MockTokenAuthenticator) {
    let mut comments = MockCommentCommand::new();
    comments
        .expect_create_comment()
        .times(1)
        .return_once(|_| Err(Error::not_found("poll not found")));

    let request = actix_web::test::TestRequest::post()
        .uri("/comments/send/")
        .insert_header(("Token", "1"))
        .set_form([("text", "hello"), ("poll_id", "9")]);
    let (status, body) = call(comments, authenticator, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "poll not found");
}

#[rstest]
#[actix_web::test]
async fn delete_requires_token(authenticator: MockTokenAuthenticator) {
    let mut comments = MockCommentCommand::new();
    comments.expect_delete_comment().never();

    let request = actix_web::test::TestRequest::post()
        .uri("/comments/delete/")
        .set_form([("comment_id", "1")]);
    let (status, _) = call(comments, authenticator, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn delete_reports_counts(authenticator: MockTokenAuthenticator) {
    let mut comments = MockCommentCommand::new();
    comments
        .expect_delete_comment()
        .withf(|request| request.requester_id.get() == 1 && request.comment_id.get() == 10)
        .times(1)
        .return_once(|request| {
            Ok(DeleteCommentResponse {
                comment_id: request.comment_id,
                removed_replies: 2,
                orphaned_replies: 0,
            })
        });

    let request = actix_web::test::TestRequest::post()
        .uri("/comments/delete/")
        .insert_header(("Token", "1"))
        .set_form([("comment_id", "10")]);
    let (status, body) = call(comments, authenticator, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_comment_id"], 10);
    assert_eq!(body["removed_replies"], 2);
    assert_eq!(body["orphaned_replies"], 0);
}

#[rstest]
#[case(ErrorCode::Forbidden, StatusCode::FORBIDDEN)]
#[case(ErrorCode::Conflict, StatusCode::CONFLICT)]
#[actix_web::test]
async fn delete_maps_domain_refusals(
    authenticator: MockTokenAuthenticator,
    #[case] code: ErrorCode,
    #[case] expected: StatusCode,
) {
    let mut comments = MockCommentCommand::new();
    comments
        .expect_delete_comment()
        .times(1)
        .return_once(move |_| Err(Error::new(code, "refused")));

    let request = actix_web::test::TestRequest::post()
        .uri("/comments/delete/")
        .insert_header(("Token", "1"))
        .set_form([("comment_id", "10")]);
    let (status, _) = call(comments, authenticator, request).await;
    assert_eq!(status, expected);
}
