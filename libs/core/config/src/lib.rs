//! Environment-driven configuration shared by the FAQ sync crates
//!
//! Every config struct implements [`FromEnv`] and reads its keys through the
//! helpers below, so a missing or malformed variable always surfaces as a
//! [`ConfigError`] naming the offending key.

pub mod tracing;

use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Deployment environment, selected by `APP_ENV`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Reads `APP_ENV`; anything other than `production`/`prod` is development
    pub fn from_env() -> Self {
        env::var("APP_ENV")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(Environment::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" | "local" => Ok(Environment::Development),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Value of `key`, or `default` when unset
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Value of `key`, or `MissingEnvVar`
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Value of `key`; unset and blank both read as `None`
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional variable, falling back to `default` when unset
///
/// A set but malformed value is an error rather than silently defaulted.
pub fn env_parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_app_env() {
        let cases = [
            (None, Environment::Development),
            (Some("production"), Environment::Production),
            (Some("PROD"), Environment::Production),
            (Some(" Production "), Environment::Production),
            (Some("staging"), Environment::Development),
        ];

        for (raw, expected) in cases {
            temp_env::with_var("APP_ENV", raw, || {
                assert_eq!(Environment::from_env(), expected, "APP_ENV={:?}", raw);
            });
        }
    }

    #[test]
    fn test_environment_display_matches_parse() {
        for env in [Environment::Development, Environment::Production] {
            assert_eq!(env.to_string().parse::<Environment>(), Ok(env));
        }
        assert!(Environment::Production.is_production());
        assert!(Environment::Development.is_development());
    }

    #[test]
    fn test_env_required_names_missing_key() {
        temp_env::with_var_unset("FAQ_TEST_REQUIRED", || {
            let err = env_required("FAQ_TEST_REQUIRED").unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "FAQ_TEST_REQUIRED"));
        });
        temp_env::with_var("FAQ_TEST_REQUIRED", Some("set"), || {
            assert_eq!(env_required("FAQ_TEST_REQUIRED").unwrap(), "set");
        });
    }

    #[test]
    fn test_env_or_default_and_optional() {
        temp_env::with_var_unset("FAQ_TEST_OPTIONAL", || {
            assert_eq!(env_or_default("FAQ_TEST_OPTIONAL", "fallback"), "fallback");
            assert_eq!(env_optional("FAQ_TEST_OPTIONAL"), None);
        });
        temp_env::with_var("FAQ_TEST_OPTIONAL", Some("  "), || {
            assert_eq!(env_optional("FAQ_TEST_OPTIONAL"), None);
        });
        temp_env::with_var("FAQ_TEST_OPTIONAL", Some("secret"), || {
            assert_eq!(env_optional("FAQ_TEST_OPTIONAL").as_deref(), Some("secret"));
        });
    }

    #[test]
    fn test_env_parse_or_default_and_value() {
        temp_env::with_var_unset("FAQ_TEST_NUMBER", || {
            assert_eq!(env_parse_or("FAQ_TEST_NUMBER", 7u64).unwrap(), 7);
        });
        temp_env::with_var("FAQ_TEST_NUMBER", Some(" 42 "), || {
            assert_eq!(env_parse_or("FAQ_TEST_NUMBER", 7u64).unwrap(), 42);
        });
    }

    #[test]
    fn test_env_parse_or_rejects_garbage() {
        temp_env::with_var("FAQ_TEST_NUMBER", Some("lots"), || {
            let err = env_parse_or("FAQ_TEST_NUMBER", 7u64).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "FAQ_TEST_NUMBER"));
        });
    }
}
