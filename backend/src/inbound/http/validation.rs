//! Shared validation helpers for inbound HTTP adapters.
//!
//! Form fields arrive as optional strings so a missing or malformed value
//! becomes a domain error with `details: {"field", "code"}` rather than an
//! extractor rejection.

use serde_json::json;

use crate::domain::{Error, IdValidationError};

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidId,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidId => "invalid_id",
        }
    }
}

/// Newtype wrapper for form field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

/// Field-scoped validation failure, converted into an [`Error`] once the
/// caller decides which status family it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldError {
    field: FieldName,
    code: ErrorCode,
    message: String,
}

impl FieldError {
    pub(crate) fn missing(field: FieldName) -> Self {
        Self {
            field,
            code: ErrorCode::MissingField,
            message: format!("missing required field: {}", field.as_str()),
        }
    }

    pub(crate) fn invalid_id(field: FieldName, source: &IdValidationError) -> Self {
        Self {
            field,
            code: ErrorCode::InvalidId,
            message: format!("{} {source}", field.as_str()),
        }
    }

    fn details(&self) -> serde_json::Value {
        json!({
            "field": self.field.as_str(),
            "code": self.code.as_str(),
        })
    }

    /// Report the failure as `400 Bad Request`.
    pub(crate) fn into_invalid_request(self) -> Error {
        let details = self.details();
        Error::invalid_request(self.message).with_details(details)
    }

    /// Report the failure as `404 Not Found`, for lookups keyed by the field.
    pub(crate) fn into_not_found(self, message: &str) -> Error {
        Error::not_found(message).with_details(self.details())
    }
}

/// Return the trimmed value, treating blank input as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Parse a required identifier field.
pub(crate) fn parse_required_id<T>(value: Option<String>, field: FieldName) -> Result<T, FieldError>
where
    T: std::str::FromStr<Err = IdValidationError>,
{
    let raw = non_blank(value).ok_or_else(|| FieldError::missing(field))?;
    raw.parse()
        .map_err(|err: IdValidationError| FieldError::invalid_id(field, &err))
}

/// Parse an optional identifier field; blank input counts as absent.
pub(crate) fn parse_optional_id<T>(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<T>, FieldError>
where
    T: std::str::FromStr<Err = IdValidationError>,
{
    non_blank(value)
        .map(|raw| {
            raw.parse()
                .map_err(|err: IdValidationError| FieldError::invalid_id(field, &err))
        })
        .transpose()
}
