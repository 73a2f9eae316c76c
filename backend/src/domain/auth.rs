//! Authentication primitives: the opaque API token presented by clients.
//!
//! Tokens are secrets. They are held in zeroizing storage, never printed by
//! `Debug`, and only ever logged through their SHA-256 fingerprint.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Number of hex characters kept from the token digest for log correlation.
const FINGERPRINT_LEN: usize = 12;

/// Reasons a raw credential is rejected before any lookup happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiTokenValidationError {
    /// No credential was supplied, or it was blank.
    #[error("authentication token is missing")]
    Missing,
}

/// Validated API token.
///
/// ## Invariants
/// - Non-empty once trimmed; surrounding whitespace is removed.
///
/// # Examples
/// ```
/// use polls_backend::domain::ApiToken;
///
/// let token = ApiToken::try_from_raw(" secret ").expect("non-blank token");
/// assert_eq!(token.expose(), "secret");
/// assert_eq!(token.fingerprint().len(), 12);
/// assert!(!format!("{token:?}").contains("secret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(Zeroizing<String>);

impl ApiToken {
    /// Validate a raw header value.
    pub fn try_from_raw(raw: &str) -> Result<Self, ApiTokenValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ApiTokenValidationError::Missing);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Secret token value, for comparison against stored credentials only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Short hex fingerprint of the token digest, safe to log.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut encoded = hex::encode(digest);
        encoded.truncate(FINGERPRINT_LEN);
        encoded
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiToken").field(&self.fingerprint()).finish()
    }
}
