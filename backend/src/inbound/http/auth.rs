//! Token authentication for HTTP handlers.
//!
//! [`TokenCredentials`] pulls the raw token out of the configured header and
//! never rejects a request itself, so handlers can authenticate before they
//! look at the body. [`authenticate`] then resolves the token through the
//! [`TokenAuthenticator`] port.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header::HeaderName, web};
use futures_util::future::{Ready, ready};
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{TokenAuthenticator, TokenAuthenticatorError};
use crate::domain::{ApiToken, Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::{DEFAULT_TOKEN_HEADER, HttpState};

/// Token presented by the caller, if any.
#[derive(Debug, Clone, Default)]
pub struct TokenCredentials(Option<ApiToken>);

impl TokenCredentials {
    /// Read the token from `header`; blank values count as absent.
    pub fn from_header(request: &HttpRequest, header: &HeaderName) -> Self {
        let token = request
            .headers()
            .get(header)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| ApiToken::try_from_raw(raw).ok());
        Self(token)
    }

    /// The presented token.
    pub fn token(&self) -> Option<&ApiToken> {
        self.0.as_ref()
    }
}

impl FromRequest for TokenCredentials {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let credentials = match req.app_data::<web::Data<HttpState>>() {
            Some(state) => Self::from_header(req, &state.token_header),
            None => Self::from_header(req, &HeaderName::from_static(DEFAULT_TOKEN_HEADER)),
        };
        ready(Ok(credentials))
    }
}

fn unauthorized(message: &str, code: &str) -> Error {
    Error::unauthorized(message).with_details(json!({ "code": code }))
}

fn map_authenticator_error(error: TokenAuthenticatorError) -> Error {
    match error {
        TokenAuthenticatorError::Connection { message } => {
            Error::service_unavailable(format!("token store unavailable: {message}"))
        }
        TokenAuthenticatorError::Query { message } => {
            Error::internal(format!("token lookup failed: {message}"))
        }
    }
}

/// Resolve the caller or fail with `401 Unauthorized`.
///
/// Missing and unknown tokens are distinguished by `details.code`
/// (`missing_token` / `unknown_token`).
pub async fn authenticate(
    authenticator: &dyn TokenAuthenticator,
    credentials: &TokenCredentials,
) -> ApiResult<User> {
    let token = credentials
        .token()
        .ok_or_else(|| unauthorized("authentication token missing", "missing_token"))?;
    match authenticator
        .resolve(token)
        .await
        .map_err(map_authenticator_error)?
    {
        Some(user) => Ok(user),
        None => {
            debug!(token = %token.fingerprint(), "unknown api token");
            Err(unauthorized("invalid authentication token", "unknown_token"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockTokenAuthenticator;
    use crate::domain::{User, UserId};
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn user() -> User {
        User::try_new(UserId::new(1).expect("positive id"), "user1", "user1@example.com")
            .expect("valid user")
    }

    fn credentials(raw: &str) -> TokenCredentials {
        TokenCredentials(Some(ApiToken::try_from_raw(raw).expect("non-blank token")))
    }

    fn detail_code(err: &Error) -> Option<&str> {
        err.details()
            .and_then(|details| details.get("code"))
            .and_then(|code| code.as_str())
    }

    #[rstest]
    #[case(None)]
    #[case(Some("   "))]
    fn blank_or_absent_headers_yield_no_token(#[case] header: Option<&str>) {
        let mut request = TestRequest::default();
        if let Some(value) = header {
            request = request.insert_header(("Token", value));
        }
        let credentials = TokenCredentials::from_header(
            &request.to_http_request(),
            &HeaderName::from_static(DEFAULT_TOKEN_HEADER),
        );
        assert!(credentials.token().is_none());
    }

    #[rstest]
    fn header_name_is_configurable() {
        let request = TestRequest::default()
            .insert_header(("X-Api-Key", "abc"))
            .to_http_request();
        let credentials =
            TokenCredentials::from_header(&request, &HeaderName::from_static("x-api-key"));
        assert_eq!(credentials.token().map(ApiToken::expose), Some("abc"));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_token_is_rejected_without_lookup() {
        let mut authenticator = MockTokenAuthenticator::new();
        authenticator.expect_resolve().never();

        let err = authenticate(&authenticator, &TokenCredentials::default())
            .await
            .expect_err("missing token");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(detail_code(&err), Some("missing_token"));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let mut authenticator = MockTokenAuthenticator::new();
        authenticator.expect_resolve().times(1).return_once(|_| Ok(None));

        let err = authenticate(&authenticator, &credentials("nope"))
            .await
            .expect_err("unknown token");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(detail_code(&err), Some("unknown_token"));
    }

    #[rstest]
    #[tokio::test]
    async fn known_token_resolves_user() {
        let mut authenticator = MockTokenAuthenticator::new();
        authenticator
            .expect_resolve()
            .withf(|token| token.expose() == "1")
            .times(1)
            .return_once(|_| Ok(Some(user())));

        let resolved = authenticate(&authenticator, &credentials("1"))
            .await
            .expect("authenticated");
        assert_eq!(resolved, user());
    }

    #[rstest]
    #[case(TokenAuthenticatorError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(TokenAuthenticatorError::query("bad sql"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn store_failures_are_not_reported_as_unauthorized(
        #[case] failure: TokenAuthenticatorError,
        #[case] expected: ErrorCode,
    ) {
        let mut authenticator = MockTokenAuthenticator::new();
        authenticator
            .expect_resolve()
            .times(1)
            .return_once(move |_| Err(failure));

        let err = authenticate(&authenticator, &credentials("1"))
            .await
            .expect_err("store failure");
        assert_eq!(err.code(), expected);
    }
}
