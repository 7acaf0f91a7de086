//! # Service Configuration
//!
//! Read once at startup from the process environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `PORT` | `8080` | HTTP listen port |
//! | `RLSID_AUTH_TOKEN` | unset | bearer secret; unset disables auth |
//! | `RLSID_CATALOG` | required | path to the YAML report catalog |
//! | `RLSID_SIGNING_KEY_HEX` | unset | 64 hex chars; unset generates an ephemeral key |
//! | `RLSID_TOKEN_TTL_SECS` | `3600` | embed credential lifetime, 60..=7200 |
//! | `RLSID_AUDIT_LOG` | unset | JSON-lines audit file |
//! | `RLSID_METRICS_ENABLED` | `true` | mount `/metrics` |
//! | `RLSID_LOG_JSON` | `false` | JSON log output |

use std::path::PathBuf;

use rlsid_encoder::{DEFAULT_TTL_SECS, MAX_TTL_SECS, MIN_TTL_SECS};
use thiserror::Error;
use zeroize::Zeroizing;

/// Error reading [`AppConfig`] from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application configuration.
///
/// Custom `Debug` redacts the auth token and signing key.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// YAML report catalog.
    pub catalog_path: PathBuf,
    /// Hex-encoded Ed25519 seed for signing embed credentials.
    pub signing_key_hex: Option<Zeroizing<String>>,
    /// Embed credential lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Optional JSON-lines audit file.
    pub audit_log: Option<PathBuf>,
    pub metrics_enabled: bool,
    pub log_json: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("catalog_path", &self.catalog_path)
            .field(
                "signing_key_hex",
                &self.signing_key_hex.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("audit_log", &self.audit_log)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            catalog_path: PathBuf::from("catalog.yaml"),
            signing_key_hex: None,
            token_ttl_secs: DEFAULT_TTL_SECS,
            audit_log: None,
            metrics_enabled: true,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        let catalog_path = var("RLSID_CATALOG")
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("RLSID_CATALOG"))?;

        let token_ttl_secs = match var("RLSID_TOKEN_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|e| ConfigError::Invalid {
                    name: "RLSID_TOKEN_TTL_SECS",
                    reason: e.to_string(),
                })?,
            None => DEFAULT_TTL_SECS,
        };
        if !(MIN_TTL_SECS..=MAX_TTL_SECS).contains(&token_ttl_secs) {
            return Err(ConfigError::Invalid {
                name: "RLSID_TOKEN_TTL_SECS",
                reason: format!("must lie within {MIN_TTL_SECS}..={MAX_TTL_SECS}, got {token_ttl_secs}"),
            });
        }

        Ok(Self {
            port,
            auth_token: var("RLSID_AUTH_TOKEN"),
            catalog_path,
            signing_key_hex: var("RLSID_SIGNING_KEY_HEX").map(Zeroizing::new),
            token_ttl_secs,
            audit_log: var("RLSID_AUDIT_LOG").map(PathBuf::from),
            metrics_enabled: var("RLSID_METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
            log_json: var("RLSID_LOG_JSON")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_catalog_is_set() {
        let config = load(&[("RLSID_CATALOG", "reports.yaml")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.catalog_path, PathBuf::from("reports.yaml"));
        assert_eq!(config.token_ttl_secs, 3600);
        assert!(config.auth_token.is_none());
        assert!(config.signing_key_hex.is_none());
        assert!(config.audit_log.is_none());
        assert!(config.metrics_enabled);
        assert!(!config.log_json);
    }

    #[test]
    fn catalog_is_required() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("RLSID_CATALOG"));
        assert_eq!(
            load(&[("RLSID_CATALOG", "  ")]).unwrap_err(),
            ConfigError::Missing("RLSID_CATALOG")
        );
    }

    #[test]
    fn ttl_outside_window_is_rejected() {
        for ttl in ["59", "7201", "-1", "soon"] {
            let err = load(&[("RLSID_CATALOG", "c.yaml"), ("RLSID_TOKEN_TTL_SECS", ttl)])
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: "RLSID_TOKEN_TTL_SECS", .. }),
                "{ttl}"
            );
        }
        let ok = load(&[("RLSID_CATALOG", "c.yaml"), ("RLSID_TOKEN_TTL_SECS", "60")]).unwrap();
        assert_eq!(ok.token_ttl_secs, 60);
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = load(&[("RLSID_CATALOG", "c.yaml"), ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn flags_parse() {
        let config = load(&[
            ("RLSID_CATALOG", "c.yaml"),
            ("RLSID_METRICS_ENABLED", "FALSE"),
            ("RLSID_LOG_JSON", "true"),
            ("RLSID_AUDIT_LOG", "/var/log/rlsid/audit.jsonl"),
        ])
        .unwrap();
        assert!(!config.metrics_enabled);
        assert!(config.log_json);
        assert_eq!(
            config.audit_log,
            Some(PathBuf::from("/var/log/rlsid/audit.jsonl"))
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let seed = "ab".repeat(32);
        let config = load(&[
            ("RLSID_CATALOG", "c.yaml"),
            ("RLSID_AUTH_TOKEN", "super-secret-token"),
            ("RLSID_SIGNING_KEY_HEX", seed.as_str()),
        ])
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(!debug.contains(&seed));
        assert!(debug.contains("[REDACTED]"));
    }
}
