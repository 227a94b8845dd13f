use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::query::PaginationPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be set when {reason}")]
    Missing { key: &'static str, reason: &'static str },

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Which `TaskService` implementation the binary wires in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Mongo {
        uri: String,
        database_name: String,
        collection: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    /// Budget for a single backend call, measured from when dispatch starts.
    pub ctx_timeout: Duration,
    pub pagination: PaginationPolicy,
    /// Legacy mode: every backend failure becomes a 500.
    pub collapse_backend_errors: bool,
    pub backend: BackendKind,
    pub frontend_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            ctx_timeout: Duration::from_secs(7),
            pagination: PaginationPolicy::default(),
            collapse_backend_errors: false,
            backend: BackendKind::Memory,
            frontend_origin: None,
        }
    }
}

/// Largest accepted `CTX_TIMEOUT`, in seconds.
pub const MAX_CTX_TIMEOUT_SECS: u64 = 86_400;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let ctx_timeout_secs: u64 = parse_var(&lookup, "CTX_TIMEOUT", 7)?;
        if ctx_timeout_secs == 0 || ctx_timeout_secs > MAX_CTX_TIMEOUT_SECS {
            return Err(ConfigError::Invalid {
                key: "CTX_TIMEOUT",
                value: ctx_timeout_secs.to_string(),
                reason: format!("must be between 1 and {} seconds", MAX_CTX_TIMEOUT_SECS),
            });
        }

        let pagination = PaginationPolicy {
            default_limit: parse_var(
                &lookup,
                "DEFAULT_PAGE_LIMIT",
                defaults.pagination.default_limit,
            )?,
            max_limit: parse_var(&lookup, "MAX_PAGE_LIMIT", defaults.pagination.max_limit)?,
            ..defaults.pagination
        };
        if pagination.default_limit > pagination.max_limit {
            return Err(ConfigError::Invalid {
                key: "DEFAULT_PAGE_LIMIT",
                value: pagination.default_limit.to_string(),
                reason: format!("exceeds MAX_PAGE_LIMIT ({})", pagination.max_limit),
            });
        }

        let backend = match lookup("TASK_BACKEND")
            .unwrap_or_else(|| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => BackendKind::Memory,
            "mongo" | "mongodb" => BackendKind::Mongo {
                uri: lookup("MONGO_URI")
                    .filter(|uri| !uri.is_empty())
                    .ok_or(ConfigError::Missing {
                        key: "MONGO_URI",
                        reason: "TASK_BACKEND=mongo",
                    })?,
                database_name: lookup("DATABASE_NAME").unwrap_or_else(|| "task_db".to_string()),
                collection: lookup("MONGO_COLLECTION").unwrap_or_else(|| "tasks".to_string()),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "TASK_BACKEND",
                    value: other.to_string(),
                    reason: "expected `memory` or `mongo`".to_string(),
                })
            }
        };

        Ok(Self {
            http_host: lookup("HTTP_HOST").unwrap_or(defaults.http_host),
            http_port: parse_var(&lookup, "HTTP_PORT", defaults.http_port)?,
            ctx_timeout: Duration::from_secs(ctx_timeout_secs),
            pagination,
            collapse_backend_errors: parse_var(&lookup, "COLLAPSE_BACKEND_ERRORS", false)?,
            backend,
            frontend_origin: lookup("FRONTEND_ORIGIN").filter(|o| !o.is_empty()),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    fn invalid_key(err: ConfigError) -> &'static str {
        match err {
            ConfigError::Invalid { key, .. } | ConfigError::Missing { key, .. } => key,
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.ctx_timeout, Duration::from_secs(7));
        assert_eq!(config.pagination.default_limit, 10);
        assert_eq!(config.pagination.max_limit, 100);
        assert_eq!(config.backend, BackendKind::Memory);
        assert!(!config.collapse_backend_errors);
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.ctx_timeout, Duration::from_secs(7));
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.frontend_origin, None);
    }

    #[test]
    fn reads_every_documented_variable() {
        let config = config_from(&[
            ("HTTP_HOST", "127.0.0.1"),
            ("HTTP_PORT", "9000"),
            ("CTX_TIMEOUT", "3"),
            ("DEFAULT_PAGE_LIMIT", "5"),
            ("MAX_PAGE_LIMIT", "50"),
            ("COLLAPSE_BACKEND_ERRORS", "true"),
            ("TASK_BACKEND", "mongo"),
            ("MONGO_URI", "mongodb://localhost:27017"),
            ("FRONTEND_ORIGIN", "http://localhost:3000"),
        ])
        .unwrap();
        assert_eq!(config.http_host, "127.0.0.1");
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.ctx_timeout, Duration::from_secs(3));
        assert_eq!(config.pagination.default_limit, 5);
        assert_eq!(config.pagination.max_limit, 50);
        assert!(config.collapse_backend_errors);
        assert_eq!(
            config.backend,
            BackendKind::Mongo {
                uri: "mongodb://localhost:27017".to_string(),
                database_name: "task_db".to_string(),
                collection: "tasks".to_string(),
            }
        );
        assert_eq!(config.frontend_origin.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn unparseable_value_names_the_variable() {
        let err = config_from(&[("HTTP_PORT", "abc")]).unwrap_err();
        assert!(err.to_string().contains("HTTP_PORT"));
        assert!(err.to_string().contains("\"abc\""));
        assert_eq!(invalid_key(err), "HTTP_PORT");

        let err = config_from(&[("COLLAPSE_BACKEND_ERRORS", "maybe")]).unwrap_err();
        assert_eq!(invalid_key(err), "COLLAPSE_BACKEND_ERRORS");
    }

    #[test]
    fn timeout_must_be_within_bounds() {
        let err = config_from(&[("CTX_TIMEOUT", "0")]).unwrap_err();
        assert_eq!(invalid_key(err), "CTX_TIMEOUT");

        let err = config_from(&[("CTX_TIMEOUT", "18446744073709551615")]).unwrap_err();
        assert!(err.to_string().contains("CTX_TIMEOUT"));

        let err = config_from(&[("CTX_TIMEOUT", "86401")]).unwrap_err();
        assert_eq!(invalid_key(err), "CTX_TIMEOUT");

        let config = config_from(&[("CTX_TIMEOUT", "86400")]).unwrap();
        assert_eq!(config.ctx_timeout, Duration::from_secs(MAX_CTX_TIMEOUT_SECS));
    }

    #[test]
    fn default_limit_may_not_exceed_maximum() {
        let err = config_from(&[("DEFAULT_PAGE_LIMIT", "20"), ("MAX_PAGE_LIMIT", "10")])
            .unwrap_err();
        assert!(err.to_string().contains("MAX_PAGE_LIMIT"));
        assert_eq!(invalid_key(err), "DEFAULT_PAGE_LIMIT");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = config_from(&[("TASK_BACKEND", "postgres")]).unwrap_err();
        assert!(err.to_string().contains("TASK_BACKEND"));
        assert_eq!(invalid_key(err), "TASK_BACKEND");
    }

    #[test]
    fn mongo_backend_requires_uri() {
        let err = config_from(&[("TASK_BACKEND", "mongo")]).unwrap_err();
        assert_eq!(err.to_string(), "MONGO_URI must be set when TASK_BACKEND=mongo");
        assert!(matches!(err, ConfigError::Missing { key: "MONGO_URI", .. }));
    }
}
