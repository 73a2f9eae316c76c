//! Application settings loaded via OrthoConfig.
//!
//! Values layer defaults, configuration files, `POLLS_*` environment
//! variables and command-line flags. Raw values stay strings here and are
//! validated by the typed accessors, so a bad value fails startup with a
//! message naming the setting.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::http::header::HeaderName;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{CommentPolicy, ParseReplyPolicyError, ReplyPolicy};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_HEADER: &str = "Token";

/// Errors raised when a configured value cannot be used.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid token header name {value:?}")]
    TokenHeader { value: String },
    #[error("invalid reply policy: {0}")]
    ReplyPolicy(#[from] ParseReplyPolicyError),
}

/// Runtime configuration for the server binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "POLLS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Seconds to wait for a pooled connection before failing the request.
    pub db_checkout_timeout_secs: Option<u64>,
    /// Request header carrying the API token.
    pub token_header: Option<String>,
    /// Whether new comments are visible immediately.
    #[ortho_config(default = true)]
    pub publish_by_default: bool,
    /// Reply handling on delete: `cascade`, `orphan` or `restrict`.
    pub reply_policy: Option<String>,
}

impl AppSettings {
    /// Configured listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// Configured token header, defaulting to `Token`.
    pub fn token_header(&self) -> Result<HeaderName, SettingsError> {
        let raw = self
            .token_header
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_HEADER)
            .trim();
        HeaderName::from_bytes(raw.as_bytes()).map_err(|_| SettingsError::TokenHeader {
            value: raw.to_owned(),
        })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool settings for the configured database, if any.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url().map(|url| {
            PoolConfig::new(url)
                .with_max_size(self.db_max_connections)
                .with_checkout_timeout(self.db_checkout_timeout_secs.map(Duration::from_secs))
        })
    }

    /// Moderation and reply handling for the comment service.
    pub fn comment_policy(&self) -> Result<CommentPolicy, SettingsError> {
        let reply_policy = match self.reply_policy.as_deref() {
            Some(raw) => raw.parse::<ReplyPolicy>()?,
            None => ReplyPolicy::default(),
        };
        Ok(CommentPolicy {
            publish_by_default: self.publish_by_default,
            reply_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "POLLS_BIND_ADDR",
        "POLLS_DATABASE_URL",
        "POLLS_DB_MAX_CONNECTIONS",
        "POLLS_DB_CHECKOUT_TIMEOUT_SECS",
        "POLLS_TOKEN_HEADER",
        "POLLS_PUBLISH_BY_DEFAULT",
        "POLLS_REPLY_POLICY",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("polls-backend")]).expect("config should load")
    }

    fn cleared_env() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn defaults_are_used_when_missing() {
        let _guard = lock_env(cleared_env());

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            SocketAddr::from(([0, 0, 0, 0], 8080))
        );
        assert_eq!(settings.token_header().expect("default header").as_str(), "token");
        assert!(settings.database_url().is_none());
        assert!(settings.pool_config().is_none());
        assert_eq!(
            settings.comment_policy().expect("default policy"),
            CommentPolicy::default()
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("POLLS_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "POLLS_DATABASE_URL",
                Some("postgres://polls@localhost/polls".to_owned()),
            ),
            ("POLLS_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("POLLS_DB_CHECKOUT_TIMEOUT_SECS", Some("5".to_owned())),
            ("POLLS_TOKEN_HEADER", Some("X-Api-Token".to_owned())),
            ("POLLS_PUBLISH_BY_DEFAULT", Some("false".to_owned())),
            ("POLLS_REPLY_POLICY", Some("restrict".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address"),
            SocketAddr::from(([127, 0, 0, 1], 9000))
        );
        assert_eq!(settings.token_header().expect("header").as_str(), "x-api-token");
        assert_eq!(
            settings.database_url(),
            Some("postgres://polls@localhost/polls")
        );
        let pool = settings.pool_config().expect("pool config");
        assert_eq!(pool.database_url(), "postgres://polls@localhost/polls");
        assert_eq!(pool.max_size(), 4);
        assert_eq!(pool.checkout_timeout(), Duration::from_secs(5));
        let policy = settings.comment_policy().expect("policy");
        assert!(!policy.publish_by_default);
        assert_eq!(policy.reply_policy, ReplyPolicy::Restrict);
    }

    #[rstest]
    fn invalid_values_are_reported() {
        let _guard = lock_env([
            ("POLLS_BIND_ADDR", Some("not an address".to_owned())),
            ("POLLS_DATABASE_URL", Some("   ".to_owned())),
            ("POLLS_DB_MAX_CONNECTIONS", None),
            ("POLLS_DB_CHECKOUT_TIMEOUT_SECS", None),
            ("POLLS_TOKEN_HEADER", Some("bad header".to_owned())),
            ("POLLS_PUBLISH_BY_DEFAULT", None),
            ("POLLS_REPLY_POLICY", Some("shred".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
        assert!(matches!(
            settings.token_header(),
            Err(SettingsError::TokenHeader { .. })
        ));
        assert!(settings.pool_config().is_none());
        assert!(matches!(
            settings.comment_policy(),
            Err(SettingsError::ReplyPolicy(_))
        ));
    }
}
