//! Application configuration loaded from environment variables.

use std::env;
use std::fmt;

use actix_web::cookie::Key;

#[cfg(feature = "postgres")]
use yatube_infra::DatabaseConfig;

/// Session keys shorter than this are refused.
pub const SESSION_KEY_MIN_LEN: usize = 64;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub session: SessionConfig,
    /// Create the demo author, group and post on an empty blog.
    pub seed_demo_data: bool,
}

/// Cookie session settings.
#[derive(Clone)]
pub struct SessionConfig {
    secret: Option<String>,
    pub cookie_secure: bool,
    pub production: bool,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("cookie_secure", &self.cookie_secure)
            .field("production", &self.production)
            .finish()
    }
}

impl SessionConfig {
    /// Derive the signing key from `SESSION_KEY`, or generate a throwaway one.
    ///
    /// A generated key logs everyone out on restart.
    pub fn key(&self) -> Key {
        match self.secret.as_deref() {
            Some(secret) if secret.len() >= SESSION_KEY_MIN_LEN => Key::derive_from(secret.as_bytes()),
            Some(secret) => {
                tracing::warn!(
                    length = secret.len(),
                    min_len = SESSION_KEY_MIN_LEN,
                    "SESSION_KEY too short; using a temporary session key"
                );
                Key::generate()
            }
            None if self.production => {
                tracing::error!("SESSION_KEY not set in production; using a temporary session key");
                Key::generate()
            }
            None => {
                tracing::warn!("SESSION_KEY not set; using a temporary session key (dev only)");
                Key::generate()
            }
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(2),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            #[cfg(feature = "postgres")]
            database,
            session: SessionConfig {
                secret: env::var("SESSION_KEY").ok().filter(|s| !s.is_empty()),
                cookie_secure: flag("COOKIE_SECURE"),
                production: env::var("RUST_ENV")
                    .map(|v| v.eq_ignore_ascii_case("production"))
                    .unwrap_or(false),
            },
            seed_demo_data: flag("SEED_DEMO_DATA"),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

fn flag(name: &str) -> bool {
    env::var(name)
        .map(|v| parse_bool(&v).unwrap_or(false))
        .unwrap_or(false)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("true", Some(true))]
    #[case("YES", Some(true))]
    #[case("1", Some(true))]
    #[case("0", Some(false))]
    #[case("no", Some(false))]
    #[case("maybe", None)]
    fn test_parse_bool(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(raw), expected);
    }

    #[test]
    fn test_debug_redacts_session_secret() {
        let session = SessionConfig {
            secret: Some("x".repeat(SESSION_KEY_MIN_LEN)),
            cookie_secure: false,
            production: false,
        };

        let rendered = format!("{:?}", session);

        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("xxxx"));
    }

    #[test]
    fn test_long_secret_derives_stable_key() {
        let session = SessionConfig {
            secret: Some("k".repeat(SESSION_KEY_MIN_LEN)),
            cookie_secure: false,
            production: false,
        };

        assert_eq!(session.key().master(), session.key().master());
    }

    #[test]
    fn test_short_secret_falls_back_to_random_key() {
        let session = SessionConfig {
            secret: Some("short".to_string()),
            cookie_secure: false,
            production: false,
        };

        assert_ne!(session.key().master(), session.key().master());
    }
}
